//! Outbound notification channels.
//!
//! Each channel delivers a [`Notification`] to a human operator through one
//! third-party messaging API. Channels report delivery as a plain boolean via
//! [`NotificationChannel::send`]; transport and API errors stay inside the
//! channel and are only logged.

pub mod kakao;
pub mod telegram;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

pub use kakao::KakaoChannel;
pub use telegram::TelegramChannel;

/// What a notification is about; channels may render kinds differently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Question,
    Reservation,
}

/// Channel-neutral outbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("request failed: {0}")]
    Http(reqwest::Error),
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("API reported failure: {0}")]
    Api(String),
}

// Request URLs can carry credentials (the Telegram bot token is a path segment)
impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        ChannelError::Http(err.without_url())
    }
}

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Name used in logs and in dispatch summaries
    fn name(&self) -> &str;

    /// Deliver one notification, surfacing the failure cause
    async fn try_send(&self, notification: &Notification) -> Result<(), ChannelError>;

    /// Deliver one notification; any failure is logged and reported as `false`
    async fn send(&self, notification: &Notification) -> bool {
        match self.try_send(notification).await {
            Ok(()) => {
                info!("Notification delivered via {}", self.name());
                true
            }
            Err(err) => {
                error!("Failed to deliver notification via {}: {}", self.name(), err);
                false
            }
        }
    }
}
