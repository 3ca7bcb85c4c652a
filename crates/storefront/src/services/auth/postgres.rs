//! `PostgreSQL`-backed accounts.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use commerce_wave_core::{Email, UserId};

use super::{
    AuthError, AuthProvider, hash_password, normalize_optional_name, validate_display_name,
    validate_password, verify_password,
};
use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Accounts stored in `storefront.user` / `storefront.user_password`.
#[derive(Clone)]
pub struct PgAuthProvider {
    pool: PgPool,
}

impl PgAuthProvider {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    const fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }
}

#[async_trait]
impl AuthProvider for PgAuthProvider {
    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let display_name = normalize_optional_name(display_name)?;
        let password_hash = hash_password(password)?;

        self.users()
            .create_with_password(&email, display_name, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users()
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    #[instrument(skip(self, name), fields(user_id = %user_id))]
    async fn update_display_name(&self, user_id: &UserId, name: &str) -> Result<User, AuthError> {
        let name = validate_display_name(name)?;

        self.users()
            .update_display_name(user_id, name)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    #[instrument(skip(self, current, new), fields(user_id = %user_id))]
    async fn change_password(
        &self,
        user_id: &UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        validate_password(new)?;

        let (_, password_hash) = self
            .users()
            .get_password_hash_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        verify_password(current, &password_hash)?;

        let new_hash = hash_password(new)?;
        self.users()
            .update_password(user_id, &new_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }
}

