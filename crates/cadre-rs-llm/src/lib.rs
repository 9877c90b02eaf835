//! Completion client boundary for Cadre.
//!
//! The delegation core only ever sees the `CompletionClient` trait; the
//! bundled implementation speaks the OpenAI chat-completions format used by
//! DeepSeek-compatible endpoints.

use async_trait::async_trait;
use log::debug;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

/// Default endpoint for the hosted completion API.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
/// Default model requested when none is configured.
pub const DEFAULT_MODEL: &str = "deepseek-chat";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Default completion token budget.
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Errors returned by completion calls.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Transport failure, including connect and timeout errors.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success status returned by the completion endpoint.
    #[error("api error (status={status}): {message}")]
    Api { status: u16, message: String },
    /// Response body did not carry a usable completion.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// A call to an external language-model completion endpoint.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete a prompt and return the trimmed response text.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// OpenAI-format HTTP completion client.
pub struct HttpCompletionClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
}

impl HttpCompletionClient {
    /// Build a client for a chat-completions endpoint.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Attach a bearer API key to every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the completion token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        debug!(
            "sending completion request (model={}, prompt_len={})",
            self.model,
            prompt.len()
        );
        let mut request = self.http.post(self.endpoint()).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = response.json().await?;
        extract_completion_text(&payload)
            .ok_or_else(|| CompletionError::MalformedResponse(payload.to_string()))
    }
}

/// Extract the trimmed text from an OpenAI-format completion response.
///
/// Returns `None` when the choices array is absent, empty, or the message
/// content is missing or blank.
fn extract_completion_text(payload: &Value) -> Option<String> {
    let text = payload
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()?
        .trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
