use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ChannelError, Notification, NotificationChannel};
use crate::config::TelegramConfig;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    #[serde(default = "default_ok")]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

fn default_ok() -> bool {
    true
}

/// Telegram Bot API channel posting to a single operator chat
pub struct TelegramChannel {
    client: Client,
    config: TelegramConfig,
}

impl TelegramChannel {
    pub fn new(client: Client, config: TelegramConfig) -> Self {
        Self { client, config }
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn try_send(&self, notification: &Notification) -> Result<(), ChannelError> {
        let request = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text: &notification.text,
        };

        // The URL embeds the bot token; log the chat only
        debug!("Sending Telegram message to chat {}", self.config.chat_id);

        let res = self
            .client
            .post(self.send_message_url())
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        info!("Telegram responded with status: {}", status);

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let response = res.json::<SendMessageResponse>().await?;
        if !response.ok {
            return Err(ChannelError::Api(
                response
                    .description
                    .unwrap_or_else(|| "sendMessage returned ok=false".to_string()),
            ));
        }

        Ok(())
    }
}
