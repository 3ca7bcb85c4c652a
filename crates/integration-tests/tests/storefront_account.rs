//! Registration, login, profile and order history.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use commerce_wave_integration_tests::{TEST_PASSWORD, TestApp};

#[tokio::test]
async fn test_register_signs_in() {
    let mut app = TestApp::new();

    let response = app.get("/auth/session").await;
    assert_eq!(response.body, json!({ "state": "anonymous" }));

    let user = app.sign_up("grace@example.com", "Grace").await;
    assert_eq!(user["display_name"], "Grace");
    assert_eq!(user["email"], "grace@example.com");

    let response = app.get("/auth/session").await;
    assert_eq!(response.body["state"], "signed_in");
    assert_eq!(response.body["user"]["id"], user["id"]);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_weak_passwords() {
    let mut app = TestApp::new();
    app.sign_up("grace@example.com", "Grace").await;

    let mut other = app.new_visitor();
    let response = other
        .post_json(
            "/auth/register",
            json!({ "email": "grace@example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = other
        .post_json(
            "/auth/register",
            json!({ "email": "alan@example.com", "password": "short" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["error"],
        "Password must be at least 6 characters."
    );
}

#[tokio::test]
async fn test_login_returns_safe_redirect() {
    let mut app = TestApp::new();
    app.sign_up("grace@example.com", "Grace").await;
    app.post("/auth/logout").await;

    let response = app
        .post_json(
            "/auth/login",
            json!({
                "email": "grace@example.com",
                "password": TEST_PASSWORD,
                "redirect": "/checkout",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["redirect_to"], "/checkout");

    let response = app
        .post_json(
            "/auth/login",
            json!({
                "email": "grace@example.com",
                "password": TEST_PASSWORD,
                "redirect": "https://evil.example/",
            }),
        )
        .await;
    assert_eq!(response.body["redirect_to"], "/");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let mut app = TestApp::new();
    app.sign_up("grace@example.com", "Grace").await;

    let mut other = app.new_visitor();
    let response = other
        .post_json(
            "/auth/login",
            json!({ "email": "grace@example.com", "password": "not it at all" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        other.get("/auth/session").await.body["state"],
        "anonymous"
    );
}

#[tokio::test]
async fn test_logout_ends_session_and_cart() {
    let mut app = TestApp::new();
    app.sign_up("grace@example.com", "Grace").await;
    app.add_to_cart("1", 1).await;

    let response = app.post("/auth/logout").await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    assert_eq!(app.get("/auth/session").await.body["state"], "anonymous");
    assert_eq!(app.get("/cart/count").await.body["count"], 0);
}

#[tokio::test]
async fn test_protected_pages_require_sign_in() {
    let mut app = TestApp::new();

    let response = app.get("/profile").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login?redirect=%2Fprofile"));

    let response = app.get("/orders").await;
    assert_eq!(response.location(), Some("/login?redirect=%2Forders"));

    let response = app.post_json("/profile", json!({ "name": "Nobody" })).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_display_name() {
    let mut app = TestApp::new();
    app.sign_up("grace@example.com", "Grace").await;

    let response = app
        .post_json("/profile", json!({ "name": "  Rear Admiral Hopper " }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["display_name"], "Rear Admiral Hopper");

    let response = app.get("/auth/session").await;
    assert_eq!(response.body["user"]["display_name"], "Rear Admiral Hopper");

    let response = app.post_json("/profile", json!({ "name": "G" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["errors"]["name"],
        "Name must be at least 2 characters."
    );
}

#[tokio::test]
async fn test_change_password() {
    let mut app = TestApp::new();
    app.sign_up("grace@example.com", "Grace").await;

    let response = app
        .post_json(
            "/profile/password",
            json!({ "current_password": "wrong guess", "new_password": "new secret" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .post_json(
            "/profile/password",
            json!({ "current_password": TEST_PASSWORD, "new_password": "abc" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["errors"]["new_password"].is_string());

    let response = app
        .post_json(
            "/profile/password",
            json!({ "current_password": TEST_PASSWORD, "new_password": "new secret" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let mut other = app.new_visitor();
    let response = other
        .post_json(
            "/auth/login",
            json!({ "email": "grace@example.com", "password": "new secret" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_order_history_is_scoped_to_user() {
    let mut grace = TestApp::new();
    grace.sign_up("grace@example.com", "Grace").await;

    let mut alan = grace.new_visitor();
    alan.sign_up("alan@example.com", "Alan").await;
    alan.add_to_cart("6", 1).await;
    let response = alan
        .post_json(
            "/checkout",
            json!({
                "name": "Alan Turing",
                "address": "1 Bletchley Park",
                "city": "Milton Keynes",
                "zip": "MK3 6",
                "card": "4000056655665556",
                "expiry": "01/29",
                "cvc": "999",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let response = grace.get("/orders").await;
    assert_eq!(response.body["state"], "empty");
    assert_eq!(response.body["orders"], json!([]));

    let response = alan.get("/orders").await;
    assert_eq!(response.body["state"], "loaded");
    assert_eq!(response.body["orders"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["orders"][0]["items"][0]["name"], "Mechanical Keyboard");
}
