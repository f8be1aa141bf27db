use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use craftshop::{config::Config, model::Repositories};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "craftshop=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let db = Arc::new(craftshop::connect(&config).await?);
    craftshop::migrate(&db).await?;

    if config.seed {
        let repos = Repositories::new(Arc::clone(&db), config.query_timeout);
        if craftshop::filler::populate_database(&repos)
            .await
            .context("could not insert demo data")?
        {
            info!("Demo data ready");
        }
    }

    craftshop::api::serve(&config, db).await?;

    Ok(())
}
