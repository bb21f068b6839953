//! Telegram Bot API emitter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::format::render_alert;
use super::{AlertEmitter, DeliveryError};
use crate::models::alert::Alert;

pub const DEFAULT_TELEGRAM_BASE_URL: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct TelegramReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramEmitter {
    client: reqwest::Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl TelegramEmitter {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(DEFAULT_TELEGRAM_BASE_URL, token, chat_id, client))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }

    async fn send_text(&self, text: &str) -> Result<(), DeliveryError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: TelegramReply = response.json().await?;
        if !reply.ok {
            return Err(DeliveryError::Rejected(
                reply.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        debug!(chat_id = %self.chat_id, "Telegram: message delivered");
        Ok(())
    }
}

#[async_trait]
impl AlertEmitter for TelegramEmitter {
    async fn send(&self, alert: &Alert) -> Result<(), DeliveryError> {
        self.send_text(&render_alert(alert)).await
    }

    async fn notify(&self, text: &str) -> Result<(), DeliveryError> {
        self.send_text(text).await
    }
}
