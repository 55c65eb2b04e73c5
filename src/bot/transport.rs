//! Seam between the engine and the chat network.

use async_trait::async_trait;

use crate::bot::message::ContactInfo;

/// What the engine needs from a chat network. Errors come back as plain
/// strings; callers log them and move on rather than branching on kinds.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Look up who a conversation address belongs to.
    async fn resolve_contact(&self, sender_id: &str) -> Result<ContactInfo, String>;

    /// Deliver one text message to a conversation address.
    async fn send_text(&self, sender_id: &str, text: &str) -> Result<(), String>;

    /// Show a typing indicator in the conversation, where the network has one.
    async fn send_typing(&self, sender_id: &str) -> Result<(), String>;
}
