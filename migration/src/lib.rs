pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_sellers;
mod m20240301_000002_create_products;

pub struct Migrator;
pub use m20240301_000001_create_sellers::Sellers;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_sellers::Migration),
            Box::new(m20240301_000002_create_products::Migration),
        ]
    }
}
