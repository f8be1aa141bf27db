mod input;
mod products;
mod sellers;

use std::{
    net::{IpAddr, SocketAddr},
    str::FromStr,
    sync::Arc,
};

use anyhow::Context;
use axum::{
    http::{header::ALLOW, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use thiserror::Error;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};
use utoipa::OpenApi;

use crate::{
    config::Config,
    model::{
        Metadata, Product, ProductPatch, Repositories, Seller, SellerPatch, StoreError, Validator,
    },
    monitoring::{health_routes, HealthMonitor},
};

use self::{
    products::{
        api_create_product, api_delete_product, api_get_product, api_list_products,
        api_update_product, CreateProductRequest, ProductList,
    },
    sellers::{
        api_create_seller, api_delete_seller, api_get_seller, api_list_sellers,
        api_update_seller, CreateSellerRequest, SellerList,
    },
};

pub(crate) const TAG_PRODUCTS: &str = "products";
pub(crate) const TAG_SELLERS: &str = "sellers";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "craftshop",
        description = "Catalog of handmade products and the sellers offering them"
    ),
    paths(
        products::api_create_product,
        products::api_list_products,
        products::api_get_product,
        products::api_update_product,
        products::api_delete_product,
        sellers::api_create_seller,
        sellers::api_list_sellers,
        sellers::api_get_seller,
        sellers::api_update_seller,
        sellers::api_delete_seller,
        crate::monitoring::api_healthcheck,
    ),
    components(schemas(
        Product,
        ProductPatch,
        ProductList,
        CreateProductRequest,
        Seller,
        SellerPatch,
        SellerList,
        CreateSellerRequest,
        Metadata,
        crate::monitoring::HealthStatus,
    )),
    tags(
        (name = "products", description = "Products offered by sellers"),
        (name = "sellers", description = "Seller accounts"),
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub(crate) struct ApiContext {
    repos: Repositories,
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum ApiErrors {
    #[error("Internal server error")]
    InternalServerError,
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Failed validation")]
    FailedValidation(Validator),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),
}

impl IntoResponse for ApiErrors {
    fn into_response(self) -> Response {
        match self {
            ApiErrors::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "the server encountered a problem and could not process your request"
                })),
            )
                .into_response(),
            ApiErrors::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiErrors::FailedValidation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": errors })),
            )
                .into_response(),
            ApiErrors::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            ApiErrors::Conflict(msg) => {
                (StatusCode::CONFLICT, Json(json!({ "error": msg }))).into_response()
            }
            ApiErrors::MethodNotAllowed(method) => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(json!({
                    "error": format!("the {method} method is not supported for this resource")
                })),
            )
                .into_response(),
        }
    }
}

impl From<StoreError> for ApiErrors {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::ValidationFailed(errors) => ApiErrors::FailedValidation(errors),
            StoreError::NotFound => {
                ApiErrors::NotFound("the requested resource could not be found".to_string())
            }
            StoreError::ConstraintViolation { kind, message } => {
                warn!("{:?} constraint violation: {}", kind, message);
                ApiErrors::Conflict("the record conflicts with existing data".to_string())
            }
            StoreError::Timeout(limit) => {
                error!("Database operation timed out after {:?}", limit);
                ApiErrors::InternalServerError
            }
            StoreError::Internal(e) => {
                error!("Database error: {}", e);
                ApiErrors::InternalServerError
            }
        }
    }
}

impl From<Validator> for ApiErrors {
    fn from(value: Validator) -> Self {
        ApiErrors::FailedValidation(value)
    }
}

async fn api_not_found() -> ApiErrors {
    ApiErrors::NotFound("the requested resource could not be found".to_string())
}

/// Gives the router's bare 405 the usual error body, keeping its `Allow` header.
async fn method_not_allowed(method: Method, response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let mut replacement = ApiErrors::MethodNotAllowed(method).into_response();
    if let Some(allow) = response.headers().get(ALLOW) {
        replacement.headers_mut().insert(ALLOW, allow.clone());
    }
    replacement
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

/// The complete HTTP surface, without the tracing layer.
pub fn app(repos: Repositories, monitor: Arc<HealthMonitor>) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            api_routes(repos).merge(health_routes(monitor)),
        )
        .fallback(api_not_found)
        .layer(middleware::map_response(method_not_allowed))
}

fn api_routes(repos: Repositories) -> Router {
    Router::new()
        .route("/products", get(api_list_products).post(api_create_product))
        .route(
            "/products/:id",
            get(api_get_product)
                .put(api_update_product)
                .delete(api_delete_product),
        )
        .route("/sellers", get(api_list_sellers).post(api_create_seller))
        .route(
            "/sellers/:id",
            get(api_get_seller)
                .put(api_update_seller)
                .delete(api_delete_seller),
        )
        .with_state(ApiContext { repos })
}

pub async fn serve(config: &Config, db: Arc<DatabaseConnection>) -> anyhow::Result<()> {
    let monitor = Arc::new(HealthMonitor::new(Arc::clone(&db), config.env));
    let repos = Repositories::new(db, config.query_timeout);
    let app = app(repos, monitor).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(IpAddr::from_str("::")?, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Cannot start server")?;

    tracing::info!("listening on {} ({})", addr, config.env);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("error running server")?;

    debug!("Shutdown complete");
    Ok(())
}
