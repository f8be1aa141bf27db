use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::debug;

pub mod api;
mod axumext;
pub mod config;
pub mod filler;
pub mod model;
pub mod monitoring;

use crate::config::Config;

pub async fn connect(config: &Config) -> Result<DatabaseConnection> {
    debug!(
        max_connections = config.max_connections,
        "connecting to database"
    );
    Database::connect(
        ConnectOptions::new(config.database_url.clone())
            .max_connections(config.max_connections)
            .to_owned(),
    )
    .await
    .context("could not connect to database_url")
}

pub async fn migrate(db: &DatabaseConnection) -> Result<(), anyhow::Error> {
    Migrator::up(db, None)
        .await
        .context("Database migration failed")
}
