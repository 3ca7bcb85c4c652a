//! Authentication route handlers.
//!
//! Registration, email/password login and logout against the configured
//! [`AuthProvider`](crate::services::auth::AuthProvider). The signed-in user
//! is kept in the session.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_session, set_current_user};
use crate::models::{AuthState, CurrentUser};
use crate::state::AppState;

/// Where login lands when no usable return path was given.
const DEFAULT_AFTER_LOGIN: &str = "/";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Path to return to after login (from `/login?redirect=...`).
    pub redirect: Option<String>,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("redirect", &self.redirect)
            .finish()
    }
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Body returned after a successful login or registration.
#[derive(Debug, Serialize)]
pub struct SignedIn {
    pub user: CurrentUser,
    /// Where the front end should navigate next.
    pub redirect_to: String,
}

/// Keep only same-site absolute paths; anything else goes home.
fn safe_redirect(target: Option<&str>) -> String {
    match target {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.contains("://") =>
        {
            path.to_string()
        }
        _ => DEFAULT_AFTER_LOGIN.to_string(),
    }
}

async fn start_session(session: &Session, user: &CurrentUser) -> Result<()> {
    set_current_user(session, user).await?;
    set_sentry_user(&user.id, user.email.as_ref().map(|e| e.as_str()));
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an account and sign it in.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<RegisterForm>,
) -> Result<Response> {
    let user = state
        .auth()
        .sign_up(&form.email, &form.password, form.name.as_deref())
        .await?;
    let current = CurrentUser::from(&user);
    start_session(&session, &current).await?;

    tracing::info!(user_id = %current.id, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(SignedIn {
            user: current,
            redirect_to: DEFAULT_AFTER_LOGIN.to_string(),
        }),
    )
        .into_response())
}

/// Sign in with email and password.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<SignedIn>> {
    let user = match state.auth().sign_in(&form.email, &form.password).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            return Err(e.into());
        }
    };
    let current = CurrentUser::from(&user);
    start_session(&session, &current).await?;

    Ok(Json(SignedIn {
        user: current,
        redirect_to: safe_redirect(form.redirect.as_deref()),
    }))
}

/// End the session. The cart is discarded with it.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_session(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The visitor's current auth state.
pub async fn current(OptionalAuth(auth): OptionalAuth) -> Json<AuthState> {
    Json(auth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_redirect() {
        assert_eq!(safe_redirect(Some("/checkout")), "/checkout");
        assert_eq!(safe_redirect(Some("/orders?page=2")), "/orders?page=2");
        assert_eq!(safe_redirect(None), "/");
        assert_eq!(safe_redirect(Some("https://evil.example")), "/");
        assert_eq!(safe_redirect(Some("//evil.example")), "/");
        assert_eq!(safe_redirect(Some("/\\evil.example")), "/");
    }

    #[test]
    fn test_forms_redact_passwords() {
        let form = LoginForm {
            email: "ada@example.com".to_string(),
            password: "hunter22".to_string(),
            redirect: None,
        };
        let debug = format!("{form:?}");
        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("[REDACTED]"));
    }
}
