//! Profile route handlers: display name and password.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, validate_display_name, validate_password};
use crate::state::AppState;

/// Shown when the password change is refused.
pub const PASSWORD_CHANGE_FAILED: &str =
    "Failed to update password. Please check your current password.";

pub const PASSWORD_CHANGED: &str = "Password updated successfully.";

/// Profile update failures.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// A form field failed validation; only that action is blocked.
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    /// The current password did not re-authenticate.
    #[error("current password rejected")]
    PasswordRejected,

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<AuthError> for ProfileError {
    fn from(err: AuthError) -> Self {
        Self::App(AppError::Auth(err))
    }
}

impl From<tower_sessions::session::Error> for ProfileError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::App(AppError::Session(err))
    }
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        match self {
            Self::Invalid { field, message } => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "errors": { field: message } })),
            )
                .into_response(),
            Self::PasswordRejected => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": PASSWORD_CHANGE_FAILED })),
            )
                .into_response(),
            Self::App(err) => err.into_response(),
        }
    }
}

/// Display name update body.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
}

/// Password change body.
#[derive(Deserialize)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for PasswordForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordForm")
            .field("current_password", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub user: CurrentUser,
}

/// The signed-in user's profile.
#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn show(RequireAuth(user): RequireAuth) -> Json<ProfileView> {
    Json(ProfileView { user })
}

/// Update the display name and refresh the session copy.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(form): Json<ProfileForm>,
) -> Result<Json<ProfileView>, ProfileError> {
    let name = validate_display_name(&form.name).map_err(|e| invalid("name", e))?;

    let updated = state.auth().update_display_name(&user.id, name).await?;
    let current = CurrentUser::from(&updated);
    set_current_user(&session, &current).await?;

    tracing::info!("Display name updated");
    Ok(Json(ProfileView { user: current }))
}

/// Change the password after re-authenticating with the current one.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(form): Json<PasswordForm>,
) -> Result<Json<serde_json::Value>, ProfileError> {
    validate_password(&form.new_password).map_err(|e| invalid("new_password", e))?;

    match state
        .auth()
        .change_password(&user.id, &form.current_password, &form.new_password)
        .await
    {
        Ok(()) => {
            tracing::info!("Password changed");
            Ok(Json(serde_json::json!({ "message": PASSWORD_CHANGED })))
        }
        Err(AuthError::InvalidCredentials | AuthError::UserNotFound) => {
            tracing::warn!("Password change rejected");
            Err(ProfileError::PasswordRejected)
        }
        Err(e) => Err(e.into()),
    }
}

fn invalid(field: &'static str, err: AuthError) -> ProfileError {
    let message = match err {
        AuthError::WeakPassword(msg) | AuthError::InvalidDisplayName(msg) => msg,
        other => other.to_string(),
    };
    ProfileError::Invalid { field, message }
}
