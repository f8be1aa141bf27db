use std::{sync::Arc, time::Duration};

use entity::{prelude::Products, product};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, Span};
use utoipa::ToSchema;

use super::{
    query::{bounded, fetch_page, log_failure},
    Filters, Metadata, StoreError, Validator,
};

/// Sort keys accepted by the product list.
pub static PRODUCT_SORT_SAFELIST: &[&str] = &[
    "id", "name", "price", "category", "-id", "-name", "-price", "-category",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Product {
    /// Assigned by the store
    pub id: i32,
    pub seller_id: i32,
    #[schema(example = "Handmade Ceramic Plant Pot")]
    pub name: String,
    pub description: String,
    #[schema(example = 19.99)]
    pub price: f64,
    #[schema(example = "Home Decor")]
    pub category: String,
    pub materials_used: String,
    pub shipping_details: String,
}

impl From<product::Model> for Product {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            seller_id: model.seller_id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            materials_used: model.materials_used,
            shipping_details: model.shipping_details,
        }
    }
}

impl Product {
    fn active_model(&self) -> product::ActiveModel {
        product::ActiveModel {
            id: NotSet,
            seller_id: Set(self.seller_id),
            name: Set(self.name.clone()),
            description: Set(self.description.clone()),
            price: Set(self.price),
            category: Set(self.category.clone()),
            materials_used: Set(self.materials_used.clone()),
            shipping_details: Set(self.shipping_details.clone()),
        }
    }
}

/// Partial product update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    pub seller_id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub materials_used: Option<String>,
    pub shipping_details: Option<String>,
}

impl ProductPatch {
    pub fn apply_to(self, product: &mut Product) {
        if let Some(seller_id) = self.seller_id {
            product.seller_id = seller_id;
        }
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(materials_used) = self.materials_used {
            product.materials_used = materials_used;
        }
        if let Some(shipping_details) = self.shipping_details {
            product.shipping_details = shipping_details;
        }
    }
}

pub fn validate_product(v: &mut Validator, product: &Product) {
    v.check(!product.name.is_empty(), "name", "must be provided");
    v.check(
        product.name.chars().count() <= 100,
        "name",
        "must not be more than 100 characters long",
    );
    v.check(
        !product.description.is_empty(),
        "description",
        "must be provided",
    );
    v.check(product.price > 0.0, "price", "must be greater than zero");
    v.check(!product.category.is_empty(), "category", "must be provided");
    v.check(
        product.category.chars().count() <= 100,
        "category",
        "must not be more than 100 characters long",
    );
    v.check(
        product.materials_used.chars().count() <= 255,
        "materials_used",
        "must not be more than 255 characters long",
    );
    v.check(
        product.shipping_details.chars().count() <= 255,
        "shipping_details",
        "must not be more than 255 characters long",
    );
    v.check(product.seller_id > 0, "seller_id", "must be provided");
}

#[derive(Clone)]
pub struct ProductRepository {
    db: Arc<DatabaseConnection>,
    span: Span,
    timeout: Duration,
}

impl ProductRepository {
    pub fn new(db: Arc<DatabaseConnection>, span: Span, timeout: Duration) -> Self {
        Self { db, span, timeout }
    }

    pub async fn get(&self, id: i32) -> Result<Product, StoreError> {
        bounded(self.timeout, Products::find_by_id(id).one(&*self.db))
            .await
            .and_then(|model| model.map(Product::from).ok_or(StoreError::NotFound))
            .inspect_err(|e| log_failure(&self.span, "get", e))
    }

    /// Stores a new product and writes the assigned id back.
    pub async fn insert(&self, product: &mut Product) -> Result<(), StoreError> {
        let model = bounded(self.timeout, product.active_model().insert(&*self.db))
            .await
            .inspect_err(|e| log_failure(&self.span, "insert", e))?;
        debug!(parent: &self.span, id = model.id, "product inserted");
        *product = model.into();
        Ok(())
    }

    /// Overwrites every column of the product with the same id.
    pub async fn update(&self, product: &mut Product) -> Result<(), StoreError> {
        let mut active = product.active_model();
        active.id = Unchanged(product.id);
        let model = bounded(self.timeout, active.update(&*self.db))
            .await
            .inspect_err(|e| log_failure(&self.span, "update", e))?;
        debug!(parent: &self.span, id = model.id, "product updated");
        *product = model.into();
        Ok(())
    }

    /// Fails with `NotFound` when no product has this id.
    pub async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let result = bounded(self.timeout, Products::delete_by_id(id).exec(&*self.db))
            .await
            .inspect_err(|e| log_failure(&self.span, "delete", e))?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        debug!(parent: &self.span, id, "product deleted");
        Ok(())
    }

    /// One page of products, optionally restricted to a category.
    pub async fn get_all(
        &self,
        category: Option<&str>,
        filters: &Filters,
    ) -> Result<(Vec<Product>, Metadata), StoreError> {
        let mut select = Products::find();
        if let Some(category) = category {
            select = select.filter(product::Column::Category.eq(category));
        }

        let (models, metadata) = fetch_page(&*self.db, select, filters, self.timeout)
            .await
            .inspect_err(|e| log_failure(&self.span, "get_all", e))?;
        debug!(
            parent: &self.span,
            rows = models.len(),
            total_records = metadata.total_records,
            "product page fetched"
        );
        Ok((models.into_iter().map(Product::from).collect(), metadata))
    }
}
