//! Console channel

use async_trait::async_trait;

use crate::core::SpikeResult;

use super::NotificationChannel;

/// Writes alerts to stdout and the `iv_spike::alerts` log target
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleChannel;

impl ConsoleChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn send_message(&self, message: &str) -> SpikeResult<()> {
        tracing::info!(target: "iv_spike::alerts", "{}", message);
        println!("🔔 NOTIFICATION: {}", message);
        Ok(())
    }
}
