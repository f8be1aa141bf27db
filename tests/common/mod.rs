#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use craftshop::model::{Product, Repositories, Seller};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// A migrated in-memory database; one connection so every query sees the same schema.
pub async fn database() -> DatabaseConnection {
    let db = Database::connect(
        ConnectOptions::new("sqlite::memory:")
            .max_connections(1)
            .min_connections(1)
            .to_owned(),
    )
    .await
    .unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn repositories() -> (Arc<DatabaseConnection>, Repositories) {
    repositories_with_timeout(Duration::from_secs(3)).await
}

pub async fn repositories_with_timeout(
    query_timeout: Duration,
) -> (Arc<DatabaseConnection>, Repositories) {
    let db = Arc::new(database().await);
    let repos = Repositories::new(Arc::clone(&db), query_timeout);
    (db, repos)
}

pub fn seller(email: &str) -> Seller {
    Seller {
        name: "Clay & Co".to_string(),
        email: email.to_string(),
        password: "kiln-fired".to_string(),
        location: "Almaty".to_string(),
        ..Default::default()
    }
}

pub fn product(seller_id: i32, name: &str, price: f64) -> Product {
    Product {
        seller_id,
        name: name.to_string(),
        description: "Artisan crafted".to_string(),
        price,
        category: "Home Decor".to_string(),
        materials_used: "Ceramic".to_string(),
        shipping_details: "Free Shipping".to_string(),
        ..Default::default()
    }
}
