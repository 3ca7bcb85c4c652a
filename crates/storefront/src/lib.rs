//! CommerceWave Storefront library.
//!
//! Catalog, session cart, checkout, order history, accounts and the AI
//! support chat and recommendations, served as a JSON API. The binary wires
//! it to `PostgreSQL` and Claude; tests drive [`app`] with in-memory backends.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ai;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod orders;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::Request};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;

use crate::middleware::{RateLimiting, create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Build the storefront router with its per-request middleware.
///
/// Sentry layers are added by the binary around this.
pub fn app<S>(state: AppState, session_store: S, rate_limiting: RateLimiting) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config());

    routes::routes(rate_limiting)
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
