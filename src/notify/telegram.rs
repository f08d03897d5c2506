//! Telegram Bot API channel

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::core::{SpikeError, SpikeResult};

use super::{NotificationChannel, TelegramConfig};

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Posts HTML messages to a chat through `sendMessage`
#[derive(Debug, Clone)]
pub struct TelegramChannel {
    client: Client,
    config: TelegramConfig,
    url: String,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: TelegramConfig) -> Self {
        let url = config.send_message_url();
        Self {
            client,
            config,
            url,
        }
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn send_message(&self, message: &str) -> SpikeResult<()> {
        if !self.is_configured() {
            tracing::warn!("Telegram not configured - message not sent");
            return Err(SpikeError::notification("telegram not configured"));
        }

        let payload = SendMessage {
            chat_id: &self.config.chat_id,
            text: message,
            parse_mode: "HTML",
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if status == StatusCode::OK {
            tracing::info!("Telegram message sent");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SpikeError::notification(format!(
                "Telegram API error: {} - {}",
                status, body
            )))
        }
    }
}
