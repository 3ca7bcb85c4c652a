//! Authentication extractors.
//!
//! The signed-in user is stored in the session under
//! [`keys::CURRENT_USER`](crate::models::session::keys::CURRENT_USER).

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{Method, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::checkout::login_redirect;
use crate::models::session::keys;
use crate::models::{AuthState, CurrentUser};

/// Extractor that requires a signed-in user.
///
/// Page reads (`GET`) are redirected to the login page with a return path;
/// other methods get a 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.greeting_name())
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection when authentication is required but nobody is signed in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login, returning to `return_to` afterwards.
    RedirectToLogin { return_to: String },
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { return_to } => {
                Redirect::to(&login_redirect(&return_to)).into_response()
            }
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Sign in required" })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = resolve(parts).await.into_user().ok_or_else(|| {
            if parts.method == Method::GET {
                // Nested routers strip their prefix from `parts.uri`
                let uri = parts
                    .extensions
                    .get::<OriginalUri>()
                    .map_or(&parts.uri, |original| &original.0);
                let return_to = uri
                    .path_and_query()
                    .map_or_else(|| uri.path().to_string(), ToString::to_string);
                AuthRejection::RedirectToLogin { return_to }
            } else {
                AuthRejection::Unauthorized
            }
        })?;

        Ok(Self(user))
    }
}

/// Extractor that resolves the visitor's [`AuthState`] without rejecting.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalAuth(auth): OptionalAuth) -> impl IntoResponse {
///     match auth.user() {
///         Some(user) => format!("Hello, {}!", user.greeting_name()),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub AuthState);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve(parts).await))
    }
}

/// Read the user from the session; a missing or unreadable session leaves the
/// state unresolved.
async fn resolve(parts: &Parts) -> AuthState {
    let Some(session) = parts.extensions.get::<Session>() else {
        return AuthState::Unresolved;
    };

    match session.get::<CurrentUser>(keys::CURRENT_USER).await {
        Ok(user) => AuthState::resolve(user),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read user from session");
            AuthState::Unresolved
        }
    }
}

/// Store the signed-in user in the session.
///
/// The session id is cycled first to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Clear the session entirely (logout). The cart goes with it.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
