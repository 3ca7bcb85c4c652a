//! Catalog and health endpoints.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::Value;

use commerce_wave_integration_tests::{TestApp, TestResponse};

fn ids(products: &Value) -> Vec<&str> {
    products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_endpoints() {
    let mut app = TestApp::new();

    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");

    let response = app.get("/health/ready").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let mut app = TestApp::new();

    let first = app.get("/health").await;
    let second = app.get("/health").await;
    let id = |r: &TestResponse| {
        r.headers["x-request-id"].to_str().unwrap().to_string()
    };
    assert_eq!(id(&first).len(), 36);
    assert_ne!(id(&first), id(&second));
}

#[tokio::test]
async fn test_listing_returns_whole_catalog_in_order() {
    let mut app = TestApp::new();

    let response = app.get("/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 6);
    assert_eq!(
        ids(&response.body["products"]),
        ["1", "2", "3", "4", "5", "6"]
    );
    assert_eq!(response.body["products"][0]["price"]["amount"], "199.99");
}

#[tokio::test]
async fn test_listing_filters_by_category_and_search() {
    let mut app = TestApp::new();

    let response = app.get("/products?category=Cameras").await;
    assert_eq!(ids(&response.body["products"]), ["3", "5"]);

    let response = app.get("/products?category=all&q=LAPTOP").await;
    assert_eq!(ids(&response.body["products"]), ["4"]);

    let response = app.get("/products?category=computers&q=headphones").await;
    assert_eq!(response.body["count"], 0);

    let response = app.get("/products?category=Garden").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_detail_by_slug() {
    let mut app = TestApp::new();

    let response = app.get("/products/smartwatch-pro").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], "2");
    assert_eq!(response.body["category"], "Electronics");

    let response = app.get("/products/flux-capacitor").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_categories_and_featured() {
    let mut app = TestApp::new();

    let response = app.get("/categories").await;
    assert_eq!(
        response.body,
        serde_json::json!(["Electronics", "Cameras", "Computers"])
    );

    let response = app.get("/featured").await;
    assert_eq!(ids(&response.body), ["1", "2", "3", "4"]);
}
