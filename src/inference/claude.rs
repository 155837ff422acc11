use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{InferenceClient, InferenceError};
use crate::config::InferenceConfig;
use crate::models::chat::{ChatTurn, Role};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<MessagePayload<'a>>,
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Client for the Anthropic Messages API
pub struct ClaudeClient {
    client: Client,
    config: InferenceConfig,
}

impl ClaudeClient {
    pub fn new(client: Client, config: InferenceConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl InferenceClient for ClaudeClient {
    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String, InferenceError> {
        let messages: Vec<MessagePayload> = turns
            .iter()
            .filter_map(|turn| {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::System => return None,
                };
                Some(MessagePayload {
                    role,
                    content: &turn.content,
                })
            })
            .collect();

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: (!system.is_empty()).then_some(system),
            messages,
        };

        let url = format!("{}/v1/messages", self.config.api_base.trim_end_matches('/'));

        info!(
            "Requesting Claude completion with model {} ({} turns)",
            self.config.model,
            request.messages.len()
        );
        debug!("API URL: {}", url);

        let res = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        info!("Response received with status: {}", status);

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(InferenceError::from_status(status.as_u16(), body));
        }

        let response = res.json::<MessagesResponse>().await?;
        response
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or(InferenceError::EmptyResponse)
    }
}
