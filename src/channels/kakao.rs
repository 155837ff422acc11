use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use super::{ChannelError, Notification, NotificationChannel, NotificationKind};
use crate::config::KakaoConfig;

const MEMO_SEND_PATH: &str = "/v2/api/talk/memo/default/send";

// Kakao "text" feed template
#[derive(Debug, Serialize)]
pub(crate) struct TextTemplate<'a> {
    object_type: &'static str,
    text: &'a str,
    link: TemplateLink<'a>,
    button_title: &'a str,
}

#[derive(Debug, Serialize)]
struct TemplateLink<'a> {
    web_url: &'a str,
    mobile_web_url: &'a str,
}

/// KakaoTalk "send to me" memo channel
pub struct KakaoChannel {
    client: Client,
    config: KakaoConfig,
}

impl KakaoChannel {
    pub fn new(client: Client, config: KakaoConfig) -> Self {
        Self { client, config }
    }

    pub(crate) fn template<'a>(&'a self, notification: &'a Notification) -> TextTemplate<'a> {
        let button_title = match notification.kind {
            NotificationKind::Question => self.config.question_button_title.as_str(),
            NotificationKind::Reservation => self.config.reservation_button_title.as_str(),
        };

        TextTemplate {
            object_type: "text",
            text: &notification.text,
            link: TemplateLink {
                web_url: &self.config.link_url,
                mobile_web_url: &self.config.link_url,
            },
            button_title,
        }
    }
}

#[async_trait]
impl NotificationChannel for KakaoChannel {
    fn name(&self) -> &str {
        "kakao"
    }

    async fn try_send(&self, notification: &Notification) -> Result<(), ChannelError> {
        let url = format!(
            "{}{}",
            self.config.api_base.trim_end_matches('/'),
            MEMO_SEND_PATH
        );

        // The memo API takes the template as a JSON string inside a form field
        let template_object = serde_json::to_string(&self.template(notification))?;

        debug!("Kakao API URL: {}", url);

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .form(&[("template_object", template_object)])
            .send()
            .await?;

        let status = res.status();
        info!("Kakao responded with status: {}", status);

        if status != reqwest::StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
