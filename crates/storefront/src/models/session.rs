//! Session-related types.
//!
//! Everything a visitor owns between requests (identity, cart, recently
//! viewed products, chat transcript) lives in their session.

use serde::{Deserialize, Serialize};

use commerce_wave_core::{Email, UserId};

use super::user::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Identifier issued by the auth provider.
    pub id: UserId,
    /// Display name, if the user has set one.
    pub display_name: Option<String>,
    /// Email address, if the provider exposes one.
    pub email: Option<Email>,
}

impl CurrentUser {
    /// Name to greet the user with: display name, else the email's local part.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or_else(|| self.email.as_ref().map(Email::local_part))
            .unwrap_or("there")
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            display_name: user.display_name.clone(),
            email: Some(user.email.clone()),
        }
    }
}

/// Where the visitor's identity stands for this request.
///
/// Starts `Unresolved` and is settled once the session has been read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "user", rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Unresolved,
    Anonymous,
    SignedIn(CurrentUser),
}

impl AuthState {
    /// Settle the state from the user found in the session.
    #[must_use]
    pub fn resolve(user: Option<CurrentUser>) -> Self {
        user.map_or(Self::Anonymous, Self::SignedIn)
    }

    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::SignedIn(user) => Some(user),
            Self::Unresolved | Self::Anonymous => None,
        }
    }

    #[must_use]
    pub fn into_user(self) -> Option<CurrentUser> {
        match self {
            Self::SignedIn(user) => Some(user),
            Self::Unresolved | Self::Anonymous => None,
        }
    }
}

/// Session keys for per-visitor data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for product ids viewed on detail pages (most recent last).
    pub const RECENTLY_VIEWED: &str = "recently_viewed";

    /// Key for the support chat transcript.
    pub const CHAT_TRANSCRIPT: &str = "chat_transcript";
}
