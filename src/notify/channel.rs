//! NotificationChannel trait

use async_trait::async_trait;

use crate::core::SpikeResult;

/// A destination for alert messages
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Short name used in logs and per-channel stats
    fn name(&self) -> &str;

    /// Whether the channel has what it needs to deliver
    fn is_configured(&self) -> bool;

    /// Deliver one message. `Ok` means the destination accepted it.
    async fn send_message(&self, message: &str) -> SpikeResult<()>;
}
