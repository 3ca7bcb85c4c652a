//! Persistence for storefront accounts and orders.
//!
//! # Schema: `storefront`
//!
//! ## Tables
//!
//! - `user` - Storefront accounts (id, email, display name)
//! - `user_password` - Argon2 password hashes
//! - `order` - Placed orders with shipping snapshot
//! - `order_item` - Order lines (product snapshot, quantity, unit price)
//! - `tower_sessions.session` - Session storage (created by `cw-cli migrate`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p commerce-wave-cli -- migrate
//! ```
//!
//! # Backends
//!
//! Route handlers only see the [`OrderStore`] trait. `PostgreSQL` backs it in
//! production; [`MemoryOrderStore`] serves local runs without a database and
//! the test suites.

pub mod memory;
pub mod orders;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use commerce_wave_core::UserId;

use crate::models::{NewOrder, Order};

pub use memory::MemoryOrderStore;
pub use orders::PgOrderStore;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Order persistence used by checkout and the orders view.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order and its items atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails; nothing is stored then.
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// All orders owned by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Check the backend is reachable. Backs `/health/ready`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend cannot be reached.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}
