//! Alert delivery
//!
//! Alerts produced by a cycle are formatted into a single message and sent
//! through every registered channel. Delivery succeeds when at least one
//! channel accepts the message.

mod channel;
mod console;
mod format;
mod manager;
mod telegram;

pub use channel::*;
pub use console::*;
pub use format::*;
pub use manager::*;
pub use telegram::*;

use serde::{Deserialize, Serialize};

use crate::core::{SpikeError, SpikeResult};

pub const BOT_TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN_HERE";
pub const CHAT_ID_PLACEHOLDER: &str = "YOUR_CHAT_ID_HERE";

/// Telegram bot credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Default: https://api.telegram.org
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: BOT_TOKEN_PLACEHOLDER.to_string(),
            chat_id: CHAT_ID_PLACEHOLDER.to_string(),
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            ..Default::default()
        }
    }

    /// Both credentials present and not left at their placeholders
    pub fn is_configured(&self) -> bool {
        let token = self.bot_token.trim();
        let chat = self.chat_id.trim();
        !token.is_empty()
            && !chat.is_empty()
            && token != BOT_TOKEN_PLACEHOLDER
            && chat != CHAT_ID_PLACEHOLDER
    }

    pub fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

/// Notification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Log alerts to the console channel
    /// Default: true
    pub console: bool,

    pub telegram: TelegramConfig,

    /// Upper bound on one channel send
    /// Default: 10
    pub send_timeout_secs: u64,

    /// Alerts listed individually in a batch message
    /// Default: 10
    pub batch_preview_limit: usize,

    /// Send a test message once the monitor starts
    /// Default: true
    pub startup_test: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            console: true,
            telegram: TelegramConfig::default(),
            send_timeout_secs: 10,
            batch_preview_limit: 10,
            startup_test: true,
        }
    }
}

impl NotifyConfig {
    pub fn validate(&self) -> SpikeResult<()> {
        if self.send_timeout_secs == 0 {
            return Err(SpikeError::config("send_timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_unconfigured() {
        assert!(!TelegramConfig::default().is_configured());
        assert!(!TelegramConfig::new("", "123").is_configured());
        assert!(!TelegramConfig::new("abc:def", CHAT_ID_PLACEHOLDER).is_configured());
        assert!(TelegramConfig::new("abc:def", "123").is_configured());
    }

    #[test]
    fn test_send_message_url() {
        let mut config = TelegramConfig::new("abc:def", "123");
        config.api_base = "http://localhost:8081/".into();
        assert_eq!(
            config.send_message_url(),
            "http://localhost:8081/botabc:def/sendMessage"
        );
    }

    #[test]
    fn test_notify_defaults() {
        let config = NotifyConfig::default();
        assert!(config.console);
        assert!(config.startup_test);
        assert_eq!(config.send_timeout_secs, 10);
        assert_eq!(config.batch_preview_limit, 10);
        assert!(config.validate().is_ok());
    }
}
