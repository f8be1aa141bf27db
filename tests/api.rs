mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{ALLOW, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use craftshop::{config::Environment, monitoring::HealthMonitor};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let (db, repos) = common::repositories().await;
    let monitor = Arc::new(HealthMonitor::new(db, Environment::Development));
    craftshop::api::app(repos, monitor)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_seller(app: &Router, email: &str) -> i64 {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/sellers",
        Some(json!({
            "name": "Clay & Co",
            "email": email,
            "password": "kiln-fired",
            "location": "Almaty",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn healthcheck_reports_environment() {
    let app = app().await;

    let (status, body) = call(&app, Method::GET, "/api/v1/healthcheck", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");
    assert_eq!(body["environment"], "development");
}

#[tokio::test]
async fn created_seller_hides_password() {
    // Arrange
    let app = app().await;
    let id = create_seller(&app, "hello@clay.example").await;

    // Act
    let (status, body) = call(&app, Method::GET, &format!("/api/v1/sellers/{id}"), None).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "hello@clay.example");
    assert!(body.get("password").is_none());
    assert!(body["date_joined"].is_string());
}

#[tokio::test]
async fn duplicate_email_is_a_field_error() {
    // Arrange
    let app = app().await;
    create_seller(&app, "hello@clay.example").await;

    // Act
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/sellers",
        Some(json!({
            "name": "Copycat",
            "email": "hello@clay.example",
            "password": "secret-ish",
            "location": "Astana",
        })),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({ "error": { "email": "a seller with this email address already exists" } })
    );
}

#[tokio::test]
async fn invalid_product_lists_field_errors() {
    // Arrange
    let app = app().await;
    let seller_id = create_seller(&app, "hello@clay.example").await;

    // Act
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/products",
        Some(json!({
            "seller_id": seller_id,
            "name": "",
            "description": "Artisan crafted",
            "price": -1.0,
            "category": "Home Decor",
        })),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({ "error": {
            "name": "must be provided",
            "price": "must be greater than zero",
        } })
    );
}

#[tokio::test]
async fn unknown_seller_is_a_field_error() {
    let app = app().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/products",
        Some(json!({
            "seller_id": 999,
            "name": "Orphan",
            "description": "Nobody sells this",
            "price": 3.0,
            "category": "Misc",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["seller_id"], "must refer to an existing seller");
}

#[tokio::test]
async fn product_lifecycle() {
    // Arrange
    let app = app().await;
    let seller_id = create_seller(&app, "hello@clay.example").await;
    let (status, created) = call(
        &app,
        Method::POST,
        "/api/v1/products",
        Some(json!({
            "seller_id": seller_id,
            "name": "Handmade Ceramic Plant Pot",
            "description": "Artisan crafted ceramic plant pot",
            "price": 19.99,
            "category": "Home Decor",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/v1/products/{}", created["id"]);

    // Act
    let (update_status, updated) =
        call(&app, Method::PUT, &uri, Some(json!({ "price": 24.5 }))).await;
    let (delete_status, deleted) = call(&app, Method::DELETE, &uri, None).await;
    let (gone_status, _) = call(&app, Method::GET, &uri, None).await;

    // Assert
    assert_eq!(update_status, StatusCode::OK);
    assert_eq!(updated["price"], 24.5);
    assert_eq!(updated["name"], "Handmade Ceramic Plant Pot");
    assert_eq!(updated["materials_used"], "");
    assert_eq!(delete_status, StatusCode::OK);
    assert_eq!(deleted, json!({ "result": "success" }));
    assert_eq!(gone_status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_returns_envelope_with_metadata() {
    // Arrange
    let app = app().await;
    let seller_id = create_seller(&app, "hello@clay.example").await;
    for (name, price) in [("Mug", 12.0), ("Vase", 40.0), ("Bowl", 18.0)] {
        call(
            &app,
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "seller_id": seller_id,
                "name": name,
                "description": "Stoneware",
                "price": price,
                "category": "Pottery",
            })),
        )
        .await;
    }

    // Act
    let (status, body) = call(
        &app,
        Method::GET,
        "/api/v1/products?category=Pottery&page_size=2&sort=-price",
        None,
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Vase", "Bowl"]);
    assert_eq!(
        body["metadata"],
        json!({
            "current_page": 1,
            "page_size": 2,
            "first_page": 1,
            "last_page": 2,
            "total_records": 3,
        })
    );
}

#[tokio::test]
async fn list_rejects_bad_parameters() {
    let app = app().await;

    let (status, body) = call(
        &app,
        Method::GET,
        "/api/v1/sellers?page=0&page_size=abc&sort=password",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({ "error": {
            "page_size": "must be an integer value",
            "page": "must be greater than zero",
            "sort": "invalid sort value",
        } })
    );
}

#[tokio::test]
async fn bad_ids_are_bad_requests() {
    let app = app().await;

    for uri in ["/api/v1/products/abc", "/api/v1/sellers/0", "/api/v1/products/-4"] {
        let (status, body) = call(&app, Method::GET, uri, None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({ "error": "invalid id parameter" }));
    }
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = app().await;

    let (status, body) = call(&app, Method::GET, "/api/v2/products", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "error": "the requested resource could not be found" })
    );
}

#[tokio::test]
async fn unknown_body_fields_are_rejected() {
    let app = app().await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/sellers",
        Some(json!({
            "name": "Clay & Co",
            "email": "hello@clay.example",
            "password": "kiln-fired",
            "location": "Almaty",
            "is_admin": true,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsupported_method_keeps_the_error_envelope() {
    // Arrange
    let app = app().await;
    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/api/v1/products")
        .body(Body::empty())
        .unwrap();

    // Act
    let response = app.oneshot(request).await.unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = response.headers().get(ALLOW).unwrap().to_str().unwrap();
    assert!(allow.contains("GET") && allow.contains("POST"), "{allow}");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        json!({ "error": "the PATCH method is not supported for this resource" })
    );
}
