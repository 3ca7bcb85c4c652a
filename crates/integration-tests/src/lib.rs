//! Integration tests for the CommerceWave storefront.
//!
//! Tests drive the full axum router in process with
//! `tower::ServiceExt::oneshot`, against in-memory backends and a scripted
//! prompt runner. No database, network or API key is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p commerce-wave-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_catalog` - Health, listing, detail, categories
//! - `storefront_cart` - Session cart operations
//! - `storefront_checkout` - Guards, validation, order placement
//! - `storefront_account` - Registration, login, profile, orders
//! - `storefront_ai` - Support chat and recommendations

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use commerce_wave_core::UserId;
use commerce_wave_storefront::ai::{PromptError, PromptRequest, PromptRunner};
use commerce_wave_storefront::config::{SentryConfig, StorefrontConfig};
use commerce_wave_storefront::db::{MemoryOrderStore, OrderStore, RepositoryError};
use commerce_wave_storefront::middleware::RateLimiting;
use commerce_wave_storefront::middleware::session::SESSION_COOKIE_NAME;
use commerce_wave_storefront::models::{NewOrder, Order};
use commerce_wave_storefront::services::auth::MemoryAuthProvider;
use commerce_wave_storefront::state::{AppState, Backends};

/// Password used by [`TestApp::sign_up`].
pub const TEST_PASSWORD: &str = "correct horse";

/// Configuration for a local, database-free storefront.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: None,
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        claude: None,
        recommendation_cache_ttl: Duration::from_secs(300),
        sentry: SentryConfig::default(),
    }
}

// =============================================================================
// Prompt runner
// =============================================================================

/// Prompt runner with a fixed reply (or failure) that records its prompts.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    reply: Option<Value>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn replying(reply: Value) -> Self {
        Self {
            reply: Some(reply),
            prompts: Mutex::default(),
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PromptRunner for ScriptedRunner {
    async fn run(&self, request: &PromptRequest) -> Result<Value, PromptError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.reply.clone().ok_or(PromptError::RateLimited(30))
    }
}

// =============================================================================
// Order store that refuses writes
// =============================================================================

/// Order store whose writes always fail; reads delegate to memory.
#[derive(Debug, Default)]
pub struct ReadOnlyOrderStore {
    inner: MemoryOrderStore,
}

#[async_trait]
impl OrderStore for ReadOnlyOrderStore {
    async fn create(&self, _order: NewOrder) -> Result<Order, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
        self.inner.list_for_user(user_id).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.inner.ping().await
    }
}

// =============================================================================
// Test application
// =============================================================================

/// A response with its body parsed as JSON (`Null` when empty, a string
/// when not JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `Location` header, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// One visitor talking to a storefront: requests share a session cookie.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// Storefront with memory backends and a runner that always fails.
    #[must_use]
    pub fn new() -> Self {
        Self::with_runner(Arc::new(ScriptedRunner::failing()))
    }

    #[must_use]
    pub fn with_runner(runner: Arc<dyn PromptRunner>) -> Self {
        Self::with_backends(Backends::in_memory(runner))
    }

    #[must_use]
    pub fn with_orders(orders: Arc<dyn OrderStore>) -> Self {
        Self::with_backends(Backends {
            orders,
            auth: Arc::new(MemoryAuthProvider::new()),
            prompts: Arc::new(ScriptedRunner::failing()),
        })
    }

    #[must_use]
    pub fn with_backends(backends: Backends) -> Self {
        let state = AppState::new(test_config(), backends);
        Self {
            router: commerce_wave_storefront::app(
                state,
                MemoryStore::default(),
                RateLimiting::Disabled,
            ),
            cookie: None,
        }
    }

    /// A second visitor on the same storefront, with no session.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&mut self, path: &str) -> TestResponse {
        self.send(Method::POST, path, None).await
    }

    pub async fn post_json(&mut self, path: &str, body: Value) -> TestResponse {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Register an account (which signs it in) and return its user JSON.
    pub async fn sign_up(&mut self, email: &str, name: &str) -> Value {
        let response = self
            .post_json(
                "/auth/register",
                serde_json::json!({ "email": email, "password": TEST_PASSWORD, "name": name }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["user"].clone()
    }

    /// Add a product to the cart.
    pub async fn add_to_cart(&mut self, product_id: &str, quantity: u32) -> TestResponse {
        let response = self
            .post_json(
                "/cart/add",
                serde_json::json!({ "product_id": product_id, "quantity": quantity }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response
    }

    async fn send(&mut self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        self.remember_cookie(response.headers());

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    fn remember_cookie(&mut self, headers: &HeaderMap) {
        let prefix = format!("{SESSION_COOKIE_NAME}=");
        for value in headers.get_all(header::SET_COOKIE) {
            let Some(pair) = value
                .to_str()
                .ok()
                .and_then(|v| v.split(';').next())
                .filter(|pair| pair.starts_with(&prefix))
            else {
                continue;
            };

            self.cookie = if pair.len() > prefix.len() {
                Some(pair.to_string())
            } else {
                None
            };
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
