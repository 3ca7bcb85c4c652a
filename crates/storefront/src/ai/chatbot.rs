//! Customer support chatbot flow and the visitor's chat transcript.

use askama::Template;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::catalog::Catalog;
use crate::models::Product;

use super::{PromptError, PromptRequest, PromptRunner, run_typed};

/// First message of every transcript.
pub const GREETING: &str = "Hello! I'm the CommerceWave assistant. How can I help you today?";

/// Bot message shown when the flow fails.
pub const CONNECTION_APOLOGY: &str =
    "Sorry, I am having trouble connecting. Please try again later.";

/// Oldest messages are dropped beyond this many.
pub const MAX_TRANSCRIPT_MESSAGES: usize = 50;

/// Flow input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportQuery {
    pub query: String,
}

/// Flow output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportReply {
    pub response: String,
}

#[derive(Template)]
#[template(path = "prompts/support_chatbot.txt")]
struct SupportChatbotPrompt<'a> {
    query: &'a str,
    products: &'a [Product],
}

fn output_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "response": {
                "type": "string",
                "description": "The response to the customer query."
            }
        },
        "required": ["response"]
    })
}

/// Answer one customer query.
///
/// Only the latest query is sent; earlier turns stay in the transcript.
///
/// # Errors
///
/// Returns `PromptError::InvalidInput` for a blank query, and any runner or
/// schema error otherwise. An empty answer counts as a schema error.
#[instrument(skip(runner, catalog, query))]
pub async fn customer_support(
    runner: &dyn PromptRunner,
    catalog: &Catalog,
    query: &SupportQuery,
) -> Result<SupportReply, PromptError> {
    let text = query.query.trim();
    if text.is_empty() {
        return Err(PromptError::InvalidInput("query is empty".to_string()));
    }

    let prompt = SupportChatbotPrompt {
        query: text,
        products: catalog.products(),
    }
    .render()?;
    let request = PromptRequest {
        name: "customer_support_chatbot",
        prompt,
        output_schema: output_schema(),
    };

    let reply: SupportReply = run_typed(runner, &request).await?;
    if reply.response.trim().is_empty() {
        return Err(PromptError::Schema("response is empty".to_string()));
    }
    Ok(reply)
}

/// Who wrote a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Outcome of one [`ChatTranscript::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    /// Bot text appended to the transcript.
    pub reply: String,
    /// False when the apology was shown instead of an answer.
    pub answered: bool,
}

/// Display history of the support chat, kept in the visitor's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::bot(GREETING)],
        }
    }
}

impl ChatTranscript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append the user's message and the bot's reply.
    ///
    /// Blank input changes nothing and returns `None`. A failed flow appends
    /// the connection apology.
    pub async fn send(
        &mut self,
        runner: &dyn PromptRunner,
        catalog: &Catalog,
        input: &str,
    ) -> Option<ChatTurn> {
        if input.trim().is_empty() {
            return None;
        }

        self.push(ChatMessage {
            sender: Sender::User,
            text: input.to_string(),
        });

        let query = SupportQuery {
            query: input.to_string(),
        };
        let turn = match customer_support(runner, catalog, &query).await {
            Ok(reply) => ChatTurn {
                reply: reply.response,
                answered: true,
            },
            Err(e) => {
                warn!(error = %e, "Support chatbot failed");
                ChatTurn {
                    reply: CONNECTION_APOLOGY.to_string(),
                    answered: false,
                }
            }
        };

        self.push(ChatMessage::bot(turn.reply.clone()));
        Some(turn)
    }

    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        if self.messages.len() > MAX_TRANSCRIPT_MESSAGES {
            let excess = self.messages.len() - MAX_TRANSCRIPT_MESSAGES;
            self.messages.drain(..excess);
        }
    }
}
