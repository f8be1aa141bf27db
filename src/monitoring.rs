use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::config::Environment;

pub struct HealthMonitor {
    db: Arc<DatabaseConnection>,
    env: Environment,
}

impl HealthMonitor {
    pub fn new(db: Arc<DatabaseConnection>, env: Environment) -> Self {
        Self { db, env }
    }

    pub async fn is_healthy(&self) -> bool {
        match self.db.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("database ping failed: {}", e);
                false
            }
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthStatus {
    #[schema(example = "available")]
    status: String,
    #[schema(example = "development")]
    environment: String,
    version: String,
}

/// Service health
#[utoipa::path(
    get,
    path = "/healthcheck",
    responses(
        (
            status = OK,
            description = "Service and database are available",
            body = HealthStatus
        ),
        (
            status = SERVICE_UNAVAILABLE,
            description = "Database is unreachable",
            body = HealthStatus
        ),
    ),
)]
pub(crate) async fn api_healthcheck(
    State(monitor): State<Arc<HealthMonitor>>,
) -> (StatusCode, Json<HealthStatus>) {
    let (code, status) = if monitor.is_healthy().await {
        (StatusCode::OK, "available")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };
    (
        code,
        Json(HealthStatus {
            status: status.to_string(),
            environment: monitor.env.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

pub(crate) fn health_routes(monitor: Arc<HealthMonitor>) -> Router {
    Router::new()
        .route("/healthcheck", get(api_healthcheck))
        .with_state(monitor)
}
