use std::{sync::Arc, time::Duration};

use chrono::{DateTime, FixedOffset};
use entity::{prelude::Sellers, seller};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, Span};
use utoipa::ToSchema;
use validator::ValidateEmail;

use super::{
    query::{bounded, fetch_page, log_failure},
    Filters, Metadata, StoreError, Validator,
};

/// Sort keys accepted by the seller list.
pub static SELLER_SORT_SAFELIST: &[&str] = &[
    "id",
    "name",
    "location",
    "date_joined",
    "-id",
    "-name",
    "-location",
    "-date_joined",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Seller {
    /// Assigned by the store
    pub id: i32,
    #[schema(example = "Clay & Co")]
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[schema(write_only)]
    pub password: String,
    #[schema(example = "Almaty")]
    pub location: String,
    /// Assigned by the store on insert
    pub date_joined: Option<DateTime<FixedOffset>>,
}

impl From<seller::Model> for Seller {
    fn from(model: seller::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            password: model.password,
            location: model.location,
            date_joined: Some(model.date_joined),
        }
    }
}

impl Seller {
    fn active_model(&self) -> seller::ActiveModel {
        seller::ActiveModel {
            id: NotSet,
            name: Set(self.name.clone()),
            email: Set(self.email.clone()),
            password: Set(self.password.clone()),
            location: Set(self.location.clone()),
            date_joined: NotSet,
        }
    }
}

/// Partial seller update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SellerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub location: Option<String>,
}

impl SellerPatch {
    pub fn apply_to(self, seller: &mut Seller) {
        if let Some(name) = self.name {
            seller.name = name;
        }
        if let Some(email) = self.email {
            seller.email = email;
        }
        if let Some(password) = self.password {
            seller.password = password;
        }
        if let Some(location) = self.location {
            seller.location = location;
        }
    }
}

pub fn validate_seller(v: &mut Validator, seller: &Seller) {
    v.check(!seller.name.is_empty(), "name", "must be provided");
    v.check(
        seller.name.chars().count() <= 100,
        "name",
        "must not be more than 100 characters long",
    );
    v.check(!seller.email.is_empty(), "email", "must be provided");
    v.check(
        seller.email.validate_email(),
        "email",
        "must be a valid email address",
    );
    v.check(!seller.location.is_empty(), "location", "must be provided");
    v.check(
        seller.location.chars().count() <= 100,
        "location",
        "must not be more than 100 characters long",
    );
    v.check(!seller.password.is_empty(), "password", "must be provided");
    v.check(
        seller.password.chars().count() >= 6,
        "password",
        "must be at least 6 characters long",
    );
}

#[derive(Clone)]
pub struct SellerRepository {
    db: Arc<DatabaseConnection>,
    span: Span,
    timeout: Duration,
}

impl SellerRepository {
    pub fn new(db: Arc<DatabaseConnection>, span: Span, timeout: Duration) -> Self {
        Self { db, span, timeout }
    }

    pub async fn get(&self, id: i32) -> Result<Seller, StoreError> {
        bounded(self.timeout, Sellers::find_by_id(id).one(&*self.db))
            .await
            .and_then(|model| model.map(Seller::from).ok_or(StoreError::NotFound))
            .inspect_err(|e| log_failure(&self.span, "get", e))
    }

    /// Stores a new seller and writes back the id and join date.
    pub async fn insert(&self, seller: &mut Seller) -> Result<(), StoreError> {
        let model = bounded(self.timeout, seller.active_model().insert(&*self.db))
            .await
            .inspect_err(|e| log_failure(&self.span, "insert", e))?;
        debug!(parent: &self.span, id = model.id, "seller inserted");
        *seller = model.into();
        Ok(())
    }

    /// Overwrites the caller-owned columns; the join date stays untouched.
    pub async fn update(&self, seller: &mut Seller) -> Result<(), StoreError> {
        let mut active = seller.active_model();
        active.id = Unchanged(seller.id);
        let model = bounded(self.timeout, active.update(&*self.db))
            .await
            .inspect_err(|e| log_failure(&self.span, "update", e))?;
        debug!(parent: &self.span, id = model.id, "seller updated");
        *seller = model.into();
        Ok(())
    }

    /// Removes the seller and, through the foreign key, its products.
    pub async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let result = bounded(self.timeout, Sellers::delete_by_id(id).exec(&*self.db))
            .await
            .inspect_err(|e| log_failure(&self.span, "delete", e))?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        debug!(parent: &self.span, id, "seller deleted");
        Ok(())
    }

    pub async fn get_all(
        &self,
        location: Option<&str>,
        filters: &Filters,
    ) -> Result<(Vec<Seller>, Metadata), StoreError> {
        let mut select = Sellers::find();
        if let Some(location) = location {
            select = select.filter(seller::Column::Location.eq(location));
        }

        let (models, metadata) = fetch_page(&*self.db, select, filters, self.timeout)
            .await
            .inspect_err(|e| log_failure(&self.span, "get_all", e))?;
        debug!(
            parent: &self.span,
            rows = models.len(),
            total_records = metadata.total_records,
            "seller page fetched"
        );
        Ok((models.into_iter().map(Seller::from).collect(), metadata))
    }
}
