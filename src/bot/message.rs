//! Plain data carried between the transport adapter and the engine.

use chrono::{DateTime, Utc};

/// One inbound message event from the transport.
///
/// `sender_id` is the opaque conversation address (`{chat_id}@user`,
/// `{chat_id}@group` or `{chat_id}@broadcast`); replies go back to the same
/// address. Immutable once built.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub sender_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Contact metadata resolved per message. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    pub display_name: String,
    /// Account handle: username when set, numeric id otherwise.
    pub handle: String,
    pub is_group: bool,
    pub is_me: bool,
}

impl ContactInfo {
    /// Fallback when the transport cannot resolve the sender. The display
    /// name feeds the Spanish-language prompt, so it stays in Spanish.
    pub fn placeholder(sender_id: &str) -> Self {
        Self {
            display_name: "Contacto desconocido".to_string(),
            handle: sender_id.to_string(),
            is_group: false,
            is_me: false,
        }
    }
}
