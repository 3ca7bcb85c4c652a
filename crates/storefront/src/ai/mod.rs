//! AI prompt flows: the support chatbot and personalised recommendations.
//!
//! A flow renders an askama instruction template, hands it to a
//! [`PromptRunner`] together with the JSON Schema of its output, and
//! deserializes the JSON object that comes back. [`ClaudeClient`] is the
//! production runner; [`UnconfiguredRunner`] stands in when no API key is
//! set, so every flow takes its failure path.

pub mod chatbot;
pub mod client;
pub mod error;
pub mod recommendations;
pub mod types;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub use chatbot::{ChatMessage, ChatTranscript, Sender, SupportQuery, SupportReply};
pub use client::ClaudeClient;
pub use error::PromptError;
pub use recommendations::{
    RecommendationRequest, RecommendationResult, RecommendationSource, Recommendations,
    Recommender,
};

/// One structured prompt invocation.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    /// Flow name, for logs.
    pub name: &'static str,
    /// Rendered instructions including the flow input.
    pub prompt: String,
    /// JSON Schema the reply must satisfy.
    pub output_schema: serde_json::Value,
}

/// Executes structured prompts against a language model.
#[async_trait]
pub trait PromptRunner: Send + Sync {
    /// Run a prompt and return the model's JSON object.
    ///
    /// # Errors
    ///
    /// Returns `PromptError` if the model cannot be reached or its reply is
    /// not a JSON object.
    async fn run(&self, request: &PromptRequest) -> Result<serde_json::Value, PromptError>;
}

/// Runner used when no model is configured; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredRunner;

#[async_trait]
impl PromptRunner for UnconfiguredRunner {
    async fn run(&self, _request: &PromptRequest) -> Result<serde_json::Value, PromptError> {
        Err(PromptError::NotConfigured)
    }
}

/// Run a prompt and deserialize the reply into the flow's output type.
async fn run_typed<T: DeserializeOwned>(
    runner: &dyn PromptRunner,
    request: &PromptRequest,
) -> Result<T, PromptError> {
    let value = runner.run(request).await?;
    serde_json::from_value(value).map_err(|e| PromptError::Schema(e.to_string()))
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::testing::ScriptedRunner;
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Reply {
        response: String,
    }

    fn request() -> PromptRequest {
        PromptRequest {
            name: "test",
            prompt: "Say hi".to_string(),
            output_schema: serde_json::json!({"type": "object"}),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_runner_always_fails() {
        assert!(matches!(
            UnconfiguredRunner.run(&request()).await,
            Err(PromptError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_run_typed_checks_schema() {
        let ok = ScriptedRunner::replying(serde_json::json!({"response": "hi"}));
        let reply: Reply = run_typed(&ok, &request()).await.unwrap();
        assert_eq!(reply.response, "hi");

        let wrong = ScriptedRunner::replying(serde_json::json!({"answer": 42}));
        assert!(matches!(
            run_typed::<Reply>(&wrong, &request()).await,
            Err(PromptError::Schema(_))
        ));
    }
}
