//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions)
//! 5. Rate limiting on `/auth` and `/chat` (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;
pub mod visitor;

pub use auth::{OptionalAuth, RequireAuth, clear_session, set_current_user};
pub use rate_limit::{RateLimiting, auth_rate_limiter, chat_rate_limiter};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
