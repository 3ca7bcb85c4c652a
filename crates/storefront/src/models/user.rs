//! User domain types.

use chrono::{DateTime, Utc};

use commerce_wave_core::{Email, UserId};

/// A storefront account as returned by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address (normalized).
    pub email: Email,
    /// Profile display name.
    pub display_name: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}
