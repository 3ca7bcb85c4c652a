//! Support chat and recommendations against a scripted prompt runner.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{Value, json};

use commerce_wave_integration_tests::{ScriptedRunner, TestApp};
use commerce_wave_storefront::ai::chatbot::{CONNECTION_APOLOGY, GREETING};

fn ids(products: &Value) -> Vec<&str> {
    products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_transcript_opens_with_greeting() {
    let mut app = TestApp::new();

    let response = app.get("/chat").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["messages"],
        json!([{ "sender": "bot", "text": GREETING }])
    );
}

#[tokio::test]
async fn test_chat_answers_and_records_transcript() {
    let runner = Arc::new(ScriptedRunner::replying(
        json!({ "response": "Standard shipping takes 3-5 business days." }),
    ));
    let mut app = TestApp::with_runner(runner.clone());

    let response = app
        .post_json("/chat", json!({ "query": "How long does shipping take?" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["answered"], true);
    assert_eq!(
        response.body["response"],
        "Standard shipping takes 3-5 business days."
    );

    let prompts = runner.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("User Query: How long does shipping take?"));

    let messages = app.get("/chat").await.body["messages"].clone();
    assert_eq!(messages.as_array().unwrap().len(), 3);
    assert_eq!(messages[1], json!({ "sender": "user", "text": "How long does shipping take?" }));
    assert_eq!(messages[2]["sender"], "bot");
}

#[tokio::test]
async fn test_chat_failure_shows_apology() {
    let mut app = TestApp::new();

    let response = app.post_json("/chat", json!({ "query": "Hello?" })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["answered"], false);
    assert_eq!(response.body["response"], CONNECTION_APOLOGY);

    let messages = app.get("/chat").await.body["messages"].clone();
    assert_eq!(messages[2]["text"], CONNECTION_APOLOGY);
}

#[tokio::test]
async fn test_blank_chat_message_is_rejected() {
    let runner = Arc::new(ScriptedRunner::replying(json!({ "response": "hi" })));
    let mut app = TestApp::with_runner(runner.clone());

    let response = app.post_json("/chat", json!({ "query": "   " })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(runner.prompts().is_empty());
    assert_eq!(
        app.get("/chat").await.body["messages"]
            .as_array()
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_anonymous_visitors_get_no_recommendations() {
    let runner = Arc::new(ScriptedRunner::replying(
        json!({ "recommended_products": ["1"] }),
    ));
    let mut app = TestApp::with_runner(runner.clone());

    let response = app.get("/recommendations").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "products": [] }));
    assert!(runner.prompts().is_empty());
}

#[tokio::test]
async fn test_failed_recommendations_fall_back() {
    let mut app = TestApp::new();
    app.sign_up("ada@example.com", "Ada").await;

    let response = app.get("/recommendations").await;
    assert_eq!(response.body["source"], "fallback");
    assert_eq!(ids(&response.body["products"]), ["3", "4", "5", "6"]);
}

#[tokio::test]
async fn test_personalised_recommendations_use_history() {
    let runner = Arc::new(ScriptedRunner::replying(
        json!({ "recommended_products": ["5", "404", "1"] }),
    ));
    let mut app = TestApp::with_runner(runner.clone());
    app.sign_up("ada@example.com", "Ada").await;
    app.get("/products/digital-camera-x1").await;

    let response = app.get("/recommendations").await;
    assert_eq!(response.body["source"], "personalized");
    assert_eq!(ids(&response.body["products"]), ["1", "5"]);

    let prompts = runner.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Browsing History:\n- 3"));
    assert!(prompts[0].contains("No past purchases"));

    // Served from cache
    app.get("/recommendations").await;
    assert_eq!(runner.prompts().len(), 1);
}

#[tokio::test]
async fn test_placing_an_order_refreshes_recommendations() {
    let runner = Arc::new(ScriptedRunner::replying(
        json!({ "recommended_products": ["2"] }),
    ));
    let mut app = TestApp::with_runner(runner.clone());
    app.sign_up("ada@example.com", "Ada").await;

    app.get("/recommendations").await;
    app.add_to_cart("6", 1).await;
    let response = app
        .post_json(
            "/checkout",
            json!({
                "name": "Ada Lovelace",
                "address": "12 Analytical Row",
                "city": "London",
                "zip": "10001",
                "card": "4242424242424242",
                "expiry": "12/30",
                "cvc": "123",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    app.get("/recommendations").await;
    let prompts = runner.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("Past Purchases:\n- 6"));
}

#[tokio::test]
async fn test_viewing_a_new_product_refreshes_recommendations() {
    let runner = Arc::new(ScriptedRunner::replying(
        json!({ "recommended_products": ["1"] }),
    ));
    let mut app = TestApp::with_runner(runner.clone());
    app.sign_up("ada@example.com", "Ada").await;
    app.get("/products/digital-camera-x1").await;

    app.get("/recommendations").await;
    // Repeat view of the latest product keeps the cache
    app.get("/products/digital-camera-x1").await;
    app.get("/recommendations").await;
    assert_eq!(runner.prompts().len(), 1);

    app.get("/products/smartwatch-pro").await;
    app.get("/recommendations").await;
    let prompts = runner.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("Browsing History:\n- 3\n- 2"));
}
