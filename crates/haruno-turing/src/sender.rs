//! Outbound delivery seam.

use async_trait::async_trait;

/// Delivers group messages through the host bot.
///
/// The host owns the connection; the plugin only sees this trait.
#[async_trait]
pub trait GroupSender: Send + Sync {
    /// Sends `message`, a CQ-code string, to `group_id`.
    async fn send_group_msg(&self, group_id: i64, message: &str);
}
