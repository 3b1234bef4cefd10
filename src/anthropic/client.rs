use std::fmt;

use reqwest::Client;
use thiserror::Error;

use super::types::{Message, MessagesRequest, MessagesResponse};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Error)]
pub enum AnthropicError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Anthropic API error: {0}")]
    Status(reqwest::StatusCode),

    #[error("response contained no text block")]
    EmptyResponse,
}

/// Minimal Messages API client. One request per call, no retries.
#[derive(Clone)]
pub struct AnthropicClient {
    http: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    pub fn new(http: Client, api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            http,
            api_key,
            model,
            max_tokens,
            base_url: ANTHROPIC_API_BASE.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single user message and return the text of the reply.
    pub async fn complete(&self, prompt: &str) -> Result<String, AnthropicError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AnthropicError::Status(status));
        }

        let parsed: MessagesResponse = resp.json().await?;
        tracing::debug!(
            model = %self.model,
            stop_reason = ?parsed.stop_reason,
            "Anthropic response received"
        );

        parsed
            .first_text()
            .map(str::to_string)
            .ok_or(AnthropicError::EmptyResponse)
    }
}
