//! Authentication service.
//!
//! Email and password accounts with Argon2id hashes. Routes talk to an
//! [`AuthProvider`]; [`PgAuthProvider`] stores accounts in `PostgreSQL` and
//! [`MemoryAuthProvider`] keeps them in process for local runs and tests.

mod error;
mod memory;
mod postgres;

pub use error::AuthError;
pub use memory::MemoryAuthProvider;
pub use postgres::PgAuthProvider;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;

use commerce_wave_core::UserId;

use crate::models::User;

/// Minimum password length (characters).
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum profile display name length (characters, after trimming).
pub const MIN_DISPLAY_NAME_LENGTH: usize = 2;

/// Account operations the storefront needs from an identity backend.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, AuthError>;

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Set the profile display name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidDisplayName` if the name is too short.
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    async fn update_display_name(&self, user_id: &UserId, name: &str) -> Result<User, AuthError>;

    /// Change the password after re-authenticating with the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if `current` is wrong.
    /// Returns `AuthError::WeakPassword` if `new` doesn't meet requirements.
    async fn change_password(
        &self,
        user_id: &UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError>;
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` with the message shown to the user.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }
    Ok(())
}

/// Validate and trim a profile display name.
///
/// # Errors
///
/// Returns `AuthError::InvalidDisplayName` with the message shown to the user.
pub fn validate_display_name(name: &str) -> Result<&str, AuthError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_DISPLAY_NAME_LENGTH {
        return Err(AuthError::InvalidDisplayName(format!(
            "Name must be at least {MIN_DISPLAY_NAME_LENGTH} characters."
        )));
    }
    Ok(trimmed)
}

/// Optional display name given at sign-up: blank means none.
fn normalize_optional_name(name: Option<&str>) -> Result<Option<&str>, AuthError> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => validate_display_name(n).map(Some),
        None => Ok(None),
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
