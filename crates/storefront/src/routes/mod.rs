//! HTTP route handlers for the storefront.
//!
//! Every endpoint answers JSON (or a redirect); the front end renders it.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (order store ping)
//!
//! # Catalog
//! GET  /products               - Listing (?category=&q=)
//! GET  /products/{slug}        - Product detail
//! GET  /categories             - Distinct categories
//! GET  /featured               - Home page products
//!
//! # Cart (session)
//! GET  /cart                   - Cart view
//! GET  /cart/count             - Count badge
//! POST /cart/add               - Add a product
//! POST /cart/update            - Set a quantity (<= 0 removes)
//! POST /cart/remove            - Remove a product
//! POST /cart/clear             - Empty the cart
//!
//! # Checkout and orders (requires auth)
//! GET  /checkout               - Order summary, or guard redirect
//! POST /checkout               - Place the order
//! GET  /orders                 - Order history
//!
//! # Profile (requires auth)
//! GET  /profile                - Profile
//! POST /profile                - Update display name
//! POST /profile/password       - Change password
//!
//! # Auth
//! POST /auth/register          - Create account and sign in
//! POST /auth/login             - Sign in
//! POST /auth/logout            - End the session
//! GET  /auth/session           - Current auth state
//!
//! # AI
//! GET  /chat                   - Chat transcript
//! POST /chat                   - Ask the support bot
//! GET  /recommendations        - Personalised products
//! ```

pub mod auth;
pub mod cart;
pub mod chat;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod profile;
pub mod recommendations;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::middleware::{RateLimiting, auth_rate_limiter, chat_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes(rate_limiting: RateLimiting) -> Router<AppState> {
    let limited = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));
    let limited = match rate_limiting {
        RateLimiting::Enabled => limited.route_layer(auth_rate_limiter()),
        RateLimiting::Disabled => limited,
    };

    limited
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::current))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show).post(profile::update))
        .route("/password", post(profile::change_password))
}

/// Create the chat routes router.
pub fn chat_routes(rate_limiting: RateLimiting) -> Router<AppState> {
    let router = Router::new().route("/", get(chat::transcript).post(chat::send));
    match rate_limiting {
        RateLimiting::Enabled => router.route_layer(chat_rate_limiter()),
        RateLimiting::Disabled => router,
    }
}

/// Create all routes for the storefront.
pub fn routes(rate_limiting: RateLimiting) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Catalog
        .nest("/products", product_routes())
        .route("/categories", get(products::categories))
        .route("/featured", get(products::featured))
        // Cart
        .nest("/cart", cart_routes())
        // Checkout and orders
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/orders", get(orders::index))
        .nest("/profile", profile_routes())
        .nest("/auth", auth_routes(rate_limiting))
        // AI
        .nest("/chat", chat_routes(rate_limiting))
        .route("/recommendations", get(recommendations::index))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the order store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.orders().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
