//! NotificationManager - fans messages out to every registered channel

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;

use crate::core::SpikeAlert;

use super::{
    format_cycle, ConsoleChannel, NotificationChannel, NotifyConfig, TelegramChannel,
    TEST_MESSAGE,
};

struct ChannelSlot {
    channel: Arc<dyn NotificationChannel>,
    sent: AtomicU64,
    failed: AtomicU64,
}

/// Per-channel delivery counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelStats {
    pub name: String,
    pub sent: u64,
    pub failed: u64,
}

/// Aggregate delivery counters for the query surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationStats {
    pub channels_configured: usize,
    pub messages_sent: u64,
    pub messages_failed: u64,
    /// sent / max(1, sent + failed) * 100
    pub success_rate: f64,
    pub telegram_configured: bool,
    pub channels: Vec<ChannelStats>,
}

/// Delivers messages through all channels
///
/// Channels are tried in registration order. A send succeeds when at least
/// one channel accepts the message; every channel attempt updates the
/// counters. Each attempt is bounded by the send timeout, and a timeout
/// counts as a failure.
pub struct NotificationManager {
    channels: Vec<ChannelSlot>,
    send_timeout: Duration,
    batch_preview_limit: usize,
    telegram_configured: bool,
    sent: AtomicU64,
    failed: AtomicU64,
}

impl NotificationManager {
    /// Manager with no channels
    pub fn new(send_timeout: Duration, batch_preview_limit: usize) -> Self {
        Self {
            channels: Vec::new(),
            send_timeout,
            batch_preview_limit,
            telegram_configured: false,
            sent: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Register Telegram (when configured) and the console channel (when enabled)
    pub fn from_config(config: &NotifyConfig) -> Self {
        let mut manager = Self::new(
            Duration::from_secs(config.send_timeout_secs),
            config.batch_preview_limit,
        );

        if config.telegram.is_configured() {
            manager.add_channel(Arc::new(TelegramChannel::new(config.telegram.clone())));
            manager.telegram_configured = true;
            tracing::info!("Telegram notifications enabled");
        } else {
            tracing::warn!(
                "Telegram not configured - set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID"
            );
        }

        if config.console {
            manager.add_channel(Arc::new(ConsoleChannel::new()));
        }

        manager
    }

    /// Register a channel; unconfigured channels are ignored
    pub fn add_channel(&mut self, channel: Arc<dyn NotificationChannel>) -> bool {
        if !channel.is_configured() {
            tracing::warn!("Skipping unconfigured channel {}", channel.name());
            return false;
        }
        tracing::info!("Added notification channel: {}", channel.name());
        self.channels.push(ChannelSlot {
            channel,
            sent: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        });
        true
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Send one message through every channel
    pub async fn send_notification(&self, message: &str) -> bool {
        if self.channels.is_empty() {
            tracing::error!("No notification channels configured");
            return false;
        }

        let mut delivered = false;
        for slot in &self.channels {
            let name = slot.channel.name();
            let ok = match timeout(self.send_timeout, slot.channel.send_message(message)).await {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    tracing::error!("Channel {} failed: {}", name, e);
                    false
                }
                Err(_) => {
                    tracing::error!(
                        "Channel {} timed out after {:?}",
                        name,
                        self.send_timeout
                    );
                    false
                }
            };

            if ok {
                delivered = true;
                slot.sent.fetch_add(1, Ordering::Relaxed);
                self.sent.fetch_add(1, Ordering::Relaxed);
            } else {
                slot.failed.fetch_add(1, Ordering::Relaxed);
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        delivered
    }

    /// Send a cycle's alerts: one message for one alert, a summary for several
    ///
    /// An empty slice sends nothing and counts as success.
    pub async fn send_spike_alerts(&self, alerts: &[SpikeAlert]) -> bool {
        match format_cycle(alerts, self.batch_preview_limit) {
            Some(message) => self.send_notification(&message).await,
            None => true,
        }
    }

    pub async fn test_notifications(&self) -> bool {
        self.send_notification(TEST_MESSAGE).await
    }

    pub fn stats(&self) -> NotificationStats {
        let sent = self.sent.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        NotificationStats {
            channels_configured: self.channels.len(),
            messages_sent: sent,
            messages_failed: failed,
            success_rate: sent as f64 / (sent + failed).max(1) as f64 * 100.0,
            telegram_configured: self.telegram_configured,
            channels: self
                .channels
                .iter()
                .map(|slot| ChannelStats {
                    name: slot.channel.name().to_string(),
                    sent: slot.sent.load(Ordering::Relaxed),
                    failed: slot.failed.load(Ordering::Relaxed),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OptionContract, OptionType, SpikeError, SpikeResult};
    use crate::notify::TelegramConfig;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        messages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationChannel for Recording {
        fn name(&self) -> &str {
            "recording"
        }
        fn is_configured(&self) -> bool {
            true
        }
        async fn send_message(&self, message: &str) -> SpikeResult<()> {
            self.messages.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl NotificationChannel for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn is_configured(&self) -> bool {
            true
        }
        async fn send_message(&self, _message: &str) -> SpikeResult<()> {
            Err(SpikeError::notification("boom"))
        }
    }

    struct Hanging;

    #[async_trait]
    impl NotificationChannel for Hanging {
        fn name(&self) -> &str {
            "hanging"
        }
        fn is_configured(&self) -> bool {
            true
        }
        async fn send_message(&self, _message: &str) -> SpikeResult<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    struct Unconfigured;

    #[async_trait]
    impl NotificationChannel for Unconfigured {
        fn name(&self) -> &str {
            "unconfigured"
        }
        fn is_configured(&self) -> bool {
            false
        }
        async fn send_message(&self, _message: &str) -> SpikeResult<()> {
            Ok(())
        }
    }

    fn alert(strike: u32) -> SpikeAlert {
        let contract = OptionContract::new(
            "NIFTY",
            strike,
            NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
            OptionType::Call,
        );
        SpikeAlert::new(contract, 20.0, 24.0, Utc::now())
    }

    fn manager() -> NotificationManager {
        NotificationManager::new(Duration::from_secs(10), 10)
    }

    #[tokio::test]
    async fn test_no_channels_fails() {
        let manager = manager();
        assert!(!manager.send_notification("hi").await);
        assert_eq!(manager.stats().messages_failed, 0);
    }

    #[tokio::test]
    async fn test_any_success_is_success() {
        let mut manager = manager();
        let recording = Arc::new(Recording::default());
        manager.add_channel(Arc::new(Failing));
        manager.add_channel(recording.clone());

        assert!(manager.send_notification("hi").await);
        assert_eq!(*recording.messages.lock().unwrap(), vec!["hi".to_string()]);

        let stats = manager.stats();
        assert_eq!(stats.channels_configured, 2);
        assert_eq!(stats.messages_sent, 1);
        assert_eq!(stats.messages_failed, 1);
        assert!((stats.success_rate - 50.0).abs() < 1e-9);
        assert_eq!(stats.channels[0].failed, 1);
        assert_eq!(stats.channels[1].sent, 1);
    }

    #[tokio::test]
    async fn test_all_failing_is_failure() {
        let mut manager = manager();
        manager.add_channel(Arc::new(Failing));
        assert!(!manager.send_notification("hi").await);
        assert_eq!(manager.stats().success_rate, 0.0);
    }

    #[tokio::test]
    async fn test_unconfigured_channel_rejected() {
        let mut manager = manager();
        assert!(!manager.add_channel(Arc::new(Unconfigured)));
        assert_eq!(manager.channel_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure() {
        let mut manager = NotificationManager::new(Duration::from_secs(2), 10);
        let recording = Arc::new(Recording::default());
        manager.add_channel(Arc::new(Hanging));
        manager.add_channel(recording.clone());

        assert!(manager.send_notification("hi").await);
        let stats = manager.stats();
        assert_eq!(stats.channels[0].failed, 1);
        assert_eq!(stats.channels[1].sent, 1);
    }

    #[tokio::test]
    async fn test_spike_alert_batching() {
        let mut manager = manager();
        let recording = Arc::new(Recording::default());
        manager.add_channel(recording.clone());

        assert!(manager.send_spike_alerts(&[]).await);
        assert!(recording.messages.lock().unwrap().is_empty());

        assert!(manager.send_spike_alerts(&[alert(20000)]).await);
        assert!(manager
            .send_spike_alerts(&[alert(20000), alert(20050), alert(20100)])
            .await);

        let messages = recording.messages.lock().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("IV SPIKE ALERT"));
        assert!(messages[1].contains("(3 alerts)"));
    }

    #[tokio::test]
    async fn test_from_config_channel_set() {
        let config = NotifyConfig::default();
        let manager = NotificationManager::from_config(&config);
        let stats = manager.stats();
        assert_eq!(stats.channels_configured, 1);
        assert!(!stats.telegram_configured);
        assert_eq!(stats.channels[0].name, "console");

        let config = NotifyConfig {
            console: false,
            telegram: TelegramConfig::new("abc:def", "42"),
            ..Default::default()
        };
        let manager = NotificationManager::from_config(&config);
        assert!(manager.stats().telegram_configured);
        assert_eq!(manager.stats().channels[0].name, "telegram");
    }

    #[tokio::test]
    async fn test_startup_message() {
        let mut manager = manager();
        let recording = Arc::new(Recording::default());
        manager.add_channel(recording.clone());

        assert!(manager.test_notifications().await);
        assert!(recording.messages.lock().unwrap()[0].contains("Test Notification"));
    }
}
