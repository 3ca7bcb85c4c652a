//! Support chat route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::ai::{ChatMessage, SupportQuery};
use crate::error::{AppError, Result};
use crate::middleware::visitor;
use crate::state::AppState;

/// Transcript document.
#[derive(Debug, Serialize)]
pub struct TranscriptView {
    pub messages: Vec<ChatMessage>,
}

/// Reply to one chat message.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
    /// False when the apology was returned instead of an answer.
    pub answered: bool,
}

/// Chat input; same shape as the flow input.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct ChatForm(pub SupportQuery);

/// The visitor's transcript, opening with the greeting.
#[instrument(skip(session))]
pub async fn transcript(session: Session) -> Result<Json<TranscriptView>> {
    let transcript = visitor::load_transcript(&session).await?;
    Ok(Json(TranscriptView {
        messages: transcript.messages().to_vec(),
    }))
}

/// Send a message to the support bot.
#[instrument(skip(state, session, form))]
pub async fn send(
    State(state): State<AppState>,
    session: Session,
    Json(ChatForm(form)): Json<ChatForm>,
) -> Result<Json<ChatReply>> {
    let mut transcript = visitor::load_transcript(&session).await?;

    let turn = transcript
        .send(state.prompts(), state.catalog(), &form.query)
        .await
        .ok_or_else(|| AppError::BadRequest("query must not be empty".to_string()))?;

    visitor::save_transcript(&session, &transcript).await?;

    Ok(Json(ChatReply {
        response: turn.reply,
        answered: turn.answered,
    }))
}
