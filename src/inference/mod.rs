//! LLM inference clients.
//!
//! Both providers implement [`InferenceClient`]: a system/context string plus
//! the role-tagged conversation goes in, a single text completion comes out.

pub mod claude;
pub mod gemini;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{InferenceConfig, InferenceProvider};
use crate::models::chat::ChatTurn;

pub use claude::ClaudeClient;
pub use gemini::GeminiClient;

// Substrings providers put in rate-limit error bodies
const RATE_LIMIT_MARKERS: [&str; 3] = ["rate_limit", "RESOURCE_EXHAUSTED", "Too Many Requests"];

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("request failed: {0}")]
    Http(reqwest::Error),
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("response contained no text")]
    EmptyResponse,
}

// Gemini sends its API key as a `key` query parameter; strip URLs from errors
impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        InferenceError::Http(err.without_url())
    }
}

impl InferenceError {
    /// Classify a non-success HTTP response
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 || contains_rate_limit_marker(&body) {
            InferenceError::RateLimited(body)
        } else {
            InferenceError::Api { status, body }
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, InferenceError::RateLimited(_))
            || contains_rate_limit_marker(&self.to_string())
    }
}

fn contains_rate_limit_marker(text: &str) -> bool {
    RATE_LIMIT_MARKERS.iter().any(|marker| text.contains(marker))
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Produce one completion. `system`-role turns in `turns` are ignored.
    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String, InferenceError>;
}

/// Build the client for the configured provider
pub fn build_client(client: reqwest::Client, config: InferenceConfig) -> Arc<dyn InferenceClient> {
    match config.provider {
        InferenceProvider::Claude => Arc::new(ClaudeClient::new(client, config)),
        InferenceProvider::Gemini => Arc::new(GeminiClient::new(client, config)),
    }
}
