//! Handler tests for Products domain
//!
//! These drive the products router through HTTP requests:
//! - Request deserialization and validation
//! - Response bodies and status codes
//! - Error responses
//!
//! The store is an in-memory repository, so no database is needed.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use common::{InMemoryProductRepository, UnavailableProductRepository};
use domain_products::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app_with<R: ProductRepository + 'static>(repository: R) -> Router {
    Router::new().nest(
        "/products",
        handlers::router(ProductService::new(repository)),
    )
}

fn app() -> Router {
    app_with(InMemoryProductRepository::new())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

async fn create(app: &Router, body: Value) -> Product {
    let response = send(app, "POST", "/products", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_create_product_returns_201_with_id_and_create_date() {
    let app = app();
    let before = chrono::Utc::now() - chrono::Duration::seconds(1);

    let response = send(
        &app,
        "POST",
        "/products",
        Some(json!({ "category": "Book", "manufacturer": "Acme", "name": "Widget" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["_id"].as_str().map(str::len), Some(24));
    assert_eq!(body["category"], "Book");
    assert_eq!(body["manufacturer"], "Acme");
    assert_eq!(body["name"], "Widget");

    let created: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(body["createDate"].clone()).unwrap();
    assert!(created >= before);
}

#[tokio::test]
async fn test_create_product_missing_fields_returns_400() {
    let app = app();

    let response = send(&app, "POST", "/products", Some(json!({ "category": "Book" }))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "error": MISSING_FIELDS }));

    let list = send(&app, "GET", "/products", None).await;
    let products: Vec<Product> = json_body(list.into_body()).await;
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_create_product_empty_field_returns_400() {
    let app = app();

    let response = send(
        &app,
        "POST",
        "/products",
        Some(json!({ "category": "Book", "manufacturer": "", "name": "Widget" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], MISSING_FIELDS);
}

#[tokio::test]
async fn test_create_product_malformed_json_returns_400() {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/products")
        .header("content-type", "application/json")
        .body(Body::from("{\"category\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_product_keeps_extra_fields_and_ignores_client_id() {
    let app = app();

    let product = create(
        &app,
        json!({
            "_id": "507f1f77bcf86cd799439011",
            "category": "Book",
            "manufacturer": "Acme",
            "name": "Widget",
            "price": 19.99,
            "tags": ["paperback"]
        }),
    )
    .await;

    assert_ne!(product.id.to_string(), "507f1f77bcf86cd799439011");
    assert_eq!(product.attributes["price"], json!(19.99));
    assert_eq!(product.attributes["tags"], json!(["paperback"]));
}

#[tokio::test]
async fn test_get_product_after_create() {
    let app = app();
    let created = create(
        &app,
        json!({ "category": "Book", "manufacturer": "Acme", "name": "Widget", "pages": 320 }),
    )
    .await;

    let response = send(&app, "GET", &format!("/products/{}", created.id), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Product = json_body(response.into_body()).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_get_unknown_product_returns_404() {
    let app = app();

    let response = send(&app, "GET", "/products/507f1f77bcf86cd799439011", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_get_malformed_id_returns_400() {
    let app = app();

    let response = send(&app, "GET", "/products/not-an-id", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Invalid id 'not-an-id'");
}

#[tokio::test]
async fn test_list_returns_all_created_products() {
    let app = app();
    let mut ids = Vec::new();
    for name in ["Widget", "Gadget", "Gizmo"] {
        let product = create(
            &app,
            json!({ "category": "Tools", "manufacturer": "Acme", "name": name }),
        )
        .await;
        ids.push(product.id);
    }

    let response = send(&app, "GET", "/products", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let products: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(products.len(), 3);
    for id in ids {
        assert!(products.iter().any(|p| p.id == id));
    }
}

#[tokio::test]
async fn test_update_replaces_fields_and_keeps_identity() {
    let app = app();
    let created = create(
        &app,
        json!({ "category": "Book", "manufacturer": "Acme", "name": "Widget", "color": "red" }),
    )
    .await;
    let uri = format!("/products/{}", created.id);

    let response = send(
        &app,
        "PUT",
        &uri,
        Some(json!({
            "_id": "507f1f77bcf86cd799439011",
            "createDate": "1999-01-01T00:00:00Z",
            "category": "Toys",
            "manufacturer": "Globex",
            "name": "Widget 2"
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());

    let fetched: Product = json_body(send(&app, "GET", &uri, None).await.into_body()).await;
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.create_date, created.create_date);
    assert_eq!(fetched.category, "Toys");
    assert_eq!(fetched.manufacturer, "Globex");
    assert_eq!(fetched.name, "Widget 2");
    // Full replace: fields not sent are gone
    assert!(!fetched.attributes.contains_key("color"));
}

#[tokio::test]
async fn test_update_with_invalid_body_returns_400() {
    let app = app();
    let created = create(
        &app,
        json!({ "category": "Book", "manufacturer": "Acme", "name": "Widget" }),
    )
    .await;
    let uri = format!("/products/{}", created.id);

    let response = send(&app, "PUT", &uri, Some(json!({ "name": "Only name" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let fetched: Product = json_body(send(&app, "GET", &uri, None).await.into_body()).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_update_unknown_product_returns_404() {
    let app = app();

    let response = send(
        &app,
        "PUT",
        "/products/507f1f77bcf86cd799439011",
        Some(json!({ "category": "Book", "manufacturer": "Acme", "name": "Widget" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_then_get_returns_404() {
    let app = app();
    let created = create(
        &app,
        json!({ "category": "Book", "manufacturer": "Acme", "name": "Widget" }),
    )
    .await;
    let uri = format!("/products/{}", created.id);

    let response = send(&app, "DELETE", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, "GET", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "DELETE", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_malformed_id_returns_400() {
    let app = app();

    let response = send(&app, "DELETE", "/products/123", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_failures_return_operation_messages() {
    let app = app_with(UnavailableProductRepository);
    let id = "/products/507f1f77bcf86cd799439011";
    let valid = json!({ "category": "Book", "manufacturer": "Acme", "name": "Widget" });

    let cases = [
        ("GET", "/products", None, "Failed to get products."),
        ("POST", "/products", Some(valid.clone()), "Failed to create new product."),
        ("GET", id, None, "Failed to get product"),
        ("PUT", id, Some(valid), "Failed to update product"),
        ("DELETE", id, None, "Failed to delete product"),
    ];

    for (method, uri, body, message) in cases {
        let response = send(&app, method, uri, body).await;
        assert_eq!(
            response.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "{method} {uri}"
        );
        let body: Value = json_body(response.into_body()).await;
        assert_eq!(body, json!({ "error": message }), "{method} {uri}");
    }
}
