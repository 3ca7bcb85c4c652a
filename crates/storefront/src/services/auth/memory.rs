//! In-process accounts for local runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use commerce_wave_core::{Email, UserId};

use super::{
    AuthError, AuthProvider, hash_password, normalize_optional_name, validate_display_name,
    validate_password, verify_password,
};
use crate::models::User;

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password_hash: String,
}

/// [`AuthProvider`] keeping accounts in a map keyed by normalized email.
#[derive(Debug, Default)]
pub struct MemoryAuthProvider {
    accounts: RwLock<HashMap<Email, Account>>,
}

impl MemoryAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let display_name = normalize_optional_name(display_name)?.map(str::to_owned);
        let password_hash = hash_password(password)?;

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&email) {
            return Err(AuthError::UserAlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(Uuid::new_v4().to_string()),
            email: email.clone(),
            display_name,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(
            email,
            Account {
                user: user.clone(),
                password_hash,
            },
        );
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let accounts = self.accounts.read().await;
        let account = accounts.get(&email).ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &account.password_hash)?;
        Ok(account.user.clone())
    }

    async fn update_display_name(&self, user_id: &UserId, name: &str) -> Result<User, AuthError> {
        let name = validate_display_name(name)?;
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .values_mut()
            .find(|a| &a.user.id == user_id)
            .ok_or(AuthError::UserNotFound)?;

        account.user.display_name = Some(name.to_owned());
        account.user.updated_at = Utc::now();
        Ok(account.user.clone())
    }

    async fn change_password(
        &self,
        user_id: &UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        validate_password(new)?;
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .values_mut()
            .find(|a| &a.user.id == user_id)
            .ok_or(AuthError::UserNotFound)?;

        verify_password(current, &account.password_hash)?;
        account.password_hash = hash_password(new)?;
        account.user.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let auth = MemoryAuthProvider::new();
        let user = auth
            .sign_up("Ada@Example.com", "analytical", Some(" Ada "))
            .await
            .unwrap();
        assert_eq!(user.email.as_str(), "ada@example.com");
        assert_eq!(user.display_name.as_deref(), Some("Ada"));

        let signed_in = auth.sign_in("ada@example.com", "analytical").await.unwrap();
        assert_eq!(signed_in.id, user.id);
    }

    #[tokio::test]
    async fn test_sign_up_rejections() {
        let auth = MemoryAuthProvider::new();
        auth.sign_up("ada@example.com", "analytical", None).await.unwrap();

        assert!(matches!(
            auth.sign_up("ADA@example.com", "different", None).await,
            Err(AuthError::UserAlreadyExists)
        ));
        assert!(matches!(
            auth.sign_up("grace@example.com", "short", None).await,
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            auth.sign_up("not-an-email", "long enough", None).await,
            Err(AuthError::InvalidEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password_or_unknown_user() {
        let auth = MemoryAuthProvider::new();
        auth.sign_up("ada@example.com", "analytical", None).await.unwrap();

        assert!(matches!(
            auth.sign_in("ada@example.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in("nobody@example.com", "analytical").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_update_display_name() {
        let auth = MemoryAuthProvider::new();
        let user = auth.sign_up("ada@example.com", "analytical", None).await.unwrap();

        let updated = auth.update_display_name(&user.id, "Countess").await.unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Countess"));
        assert!(matches!(
            auth.update_display_name(&user.id, "C").await,
            Err(AuthError::InvalidDisplayName(_))
        ));
        assert!(matches!(
            auth.update_display_name(&UserId::new("ghost"), "Ghost").await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let auth = MemoryAuthProvider::new();
        let user = auth.sign_up("ada@example.com", "analytical", None).await.unwrap();

        assert!(matches!(
            auth.change_password(&user.id, "wrong-current", "engine-2").await,
            Err(AuthError::InvalidCredentials)
        ));
        auth.sign_in("ada@example.com", "analytical").await.unwrap();

        auth.change_password(&user.id, "analytical", "engine-2")
            .await
            .unwrap();
        assert!(auth.sign_in("ada@example.com", "analytical").await.is_err());
        auth.sign_in("ada@example.com", "engine-2").await.unwrap();
    }
}
