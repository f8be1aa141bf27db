//! Data access for the catalog: the list-query machinery shared by every
//! entity and one repository per entity type.

mod error;
mod filters;
mod metadata;
pub mod products;
mod query;
pub mod sellers;
mod validation;

use std::{sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;
use tracing::info_span;

pub use self::{
    error::{Constraint, StoreError},
    filters::{validate_filters, Filters, SortDirection, MAX_PAGE, MAX_PAGE_SIZE},
    metadata::{calculate_metadata, Metadata},
    products::{
        validate_product, Product, ProductPatch, ProductRepository, PRODUCT_SORT_SAFELIST,
    },
    sellers::{validate_seller, Seller, SellerPatch, SellerRepository, SELLER_SORT_SAFELIST},
    validation::{permitted_value, Validator},
};

/// Default ceiling for a single store round trip.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// All repositories of the service, sharing one pooled connection.
#[derive(Clone)]
pub struct Repositories {
    pub products: ProductRepository,
    pub sellers: SellerRepository,
}

impl Repositories {
    pub fn new(db: Arc<DatabaseConnection>, query_timeout: Duration) -> Self {
        Self {
            products: ProductRepository::new(
                Arc::clone(&db),
                info_span!("repository", entity = "products"),
                query_timeout,
            ),
            sellers: SellerRepository::new(
                db,
                info_span!("repository", entity = "sellers"),
                query_timeout,
            ),
        }
    }
}
