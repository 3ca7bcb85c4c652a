//! Claude API client for the storefront prompt flows.
//!
//! Each flow sends one user message (the rendered instruction template) and
//! asks for a single JSON object matching the flow's output schema.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::config::ClaudeConfig;

use super::error::{ApiErrorResponse, PromptError};
use super::types::{ChatRequest, ChatResponse, Message, StopReason};
use super::{PromptRequest, PromptRunner};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Claude API client.
#[derive(Clone)]
pub struct ClaudeClient {
    inner: Arc<ClaudeClientInner>,
}

struct ClaudeClientInner {
    client: reqwest::Client,
    model: String,
}

impl ClaudeClient {
    /// Create a new Claude client.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::Unauthorized` if the API key cannot be sent as a
    /// header, or `PromptError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClaudeConfig) -> Result<Self, PromptError> {
        let api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| PromptError::Unauthorized("API key is not a valid header".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-api-key", api_key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClaudeClientInner {
                client,
                model: config.model.clone(),
            }),
        })
    }

    /// Send a chat request and get a complete response.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, messages, system), fields(model = %self.inner.model))]
    pub async fn chat(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
    ) -> Result<ChatResponse, PromptError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages,
            system,
        };

        let response = self
            .inner
            .client
            .post(ANTHROPIC_API_URL)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| PromptError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(handle_error_status(status, response).await)
        }
    }
}

#[async_trait]
impl PromptRunner for ClaudeClient {
    #[instrument(skip(self, request), fields(flow = request.name))]
    async fn run(&self, request: &PromptRequest) -> Result<serde_json::Value, PromptError> {
        let system = structured_output_instructions(&request.output_schema);
        let response = self
            .chat(vec![Message::user(request.prompt.clone())], Some(system))
            .await?;

        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Prompt completed"
        );

        if response.stop_reason == Some(StopReason::MaxTokens) {
            return Err(PromptError::Parse("reply truncated at max_tokens".to_string()));
        }

        extract_json(&response.text())
    }
}

/// System prompt asking for a bare JSON reply.
fn structured_output_instructions(schema: &serde_json::Value) -> String {
    format!(
        "Reply with a single JSON object and nothing else. \
         The object must validate against this JSON Schema:\n{schema}"
    )
}

/// Parse the JSON object out of a model reply, tolerating code fences and
/// surrounding prose.
fn extract_json(text: &str) -> Result<serde_json::Value, PromptError> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => trimmed
            .get(start..=end)
            .ok_or_else(|| PromptError::Parse("reply is not valid UTF-8 at JSON bounds".to_string()))
            .and_then(|json| {
                serde_json::from_str(json)
                    .map_err(|e| PromptError::Parse(format!("reply is not JSON: {e}")))
            }),
        _ => Err(PromptError::Parse("reply contains no JSON object".to_string())),
    }
}

/// Handle an error status code.
async fn handle_error_status(status: reqwest::StatusCode, response: reqwest::Response) -> PromptError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return PromptError::RateLimited(retry_after);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return PromptError::Unauthorized("Invalid API key".to_string());
    }

    match response.text().await {
        Ok(body) => serde_json::from_str::<ApiErrorResponse>(&body).map_or_else(
            |_| PromptError::Api {
                error_type: "unknown".to_string(),
                message: body.clone(),
            },
            |api_error| PromptError::Api {
                error_type: api_error.error.error_type,
                message: api_error.error.message,
            },
        ),
        Err(e) => PromptError::Http(e),
    }
}
