//! Telegram transport using teloxide.
//!
//! Conversations are addressed as `{chat_id}@user`, `{chat_id}@group` or
//! `{chat_id}@broadcast`. The address is opaque to the rest of the bot; only
//! the `@broadcast` suffix carries meaning (the classifier screens it out).
//! Telegram pushes sender metadata with every update, so lookups go through
//! a directory recorded from the updates themselves instead of extra API
//! round trips.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatKind};
use tracing::warn;

use crate::bot::message::ContactInfo;
use crate::bot::transport::Transport;

pub struct TelegramTransport {
    bot: Bot,
    own_id: UserId,
    directory: RwLock<HashMap<String, ContactInfo>>,
}

impl TelegramTransport {
    pub fn new(bot: Bot, own_id: UserId) -> Self {
        Self {
            bot,
            own_id,
            directory: RwLock::new(HashMap::new()),
        }
    }

    /// Record the sender of an update and return its conversation address.
    pub fn remember(&self, msg: &Message) -> String {
        let address = conversation_address(msg);
        let contact = contact_from_message(msg, self.own_id);
        self.directory
            .write()
            .expect("contact directory lock poisoned")
            .insert(address.clone(), contact);
        address
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn resolve_contact(&self, sender_id: &str) -> Result<ContactInfo, String> {
        self.directory
            .read()
            .expect("contact directory lock poisoned")
            .get(sender_id)
            .cloned()
            .ok_or_else(|| format!("No contact recorded for {sender_id}"))
    }

    async fn send_text(&self, sender_id: &str, text: &str) -> Result<(), String> {
        let chat_id = parse_chat_id(sender_id)?;
        self.bot
            .send_message(chat_id, text)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to send: {e}");
                warn!("{}", msg);
                msg
            })
    }

    async fn send_typing(&self, sender_id: &str) -> Result<(), String> {
        let chat_id = parse_chat_id(sender_id)?;
        self.bot
            .send_chat_action(chat_id, ChatAction::Typing)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to send typing action: {e}");
                warn!("{}", msg);
                msg
            })
    }
}

/// Address for the conversation a message arrived in. Channel voices
/// (posts relayed into discussion groups, anonymous channel senders) count
/// as broadcast.
fn conversation_address(msg: &Message) -> String {
    let class = match msg.chat.kind {
        ChatKind::Private(_) => "user",
        ChatKind::Public(_) => {
            let channel_voice = msg.chat.is_channel()
                || msg.sender_chat.as_ref().is_some_and(|c| c.is_channel());
            if channel_voice { "broadcast" } else { "group" }
        }
    };
    format!("{}@{class}", msg.chat.id.0)
}

/// Sender metadata out of one update. Falls back to the placeholder when
/// Telegram attaches no sender at all.
fn contact_from_message(msg: &Message, own_id: UserId) -> ContactInfo {
    let is_group = matches!(msg.chat.kind, ChatKind::Public(_));

    // Anonymous admins and channels speak with the chat's identity.
    if let Some(ref sender_chat) = msg.sender_chat {
        return ContactInfo {
            display_name: sender_chat.title().unwrap_or("Sin nombre").to_string(),
            handle: sender_chat.id.0.to_string(),
            is_group,
            is_me: false,
        };
    }

    match msg.from {
        Some(ref user) => ContactInfo {
            display_name: user.full_name(),
            handle: user
                .username
                .clone()
                .unwrap_or_else(|| user.id.0.to_string()),
            is_group,
            is_me: user.id == own_id,
        },
        None => ContactInfo::placeholder(&conversation_address(msg)),
    }
}

fn parse_chat_id(sender_id: &str) -> Result<ChatId, String> {
    let (id, _) = sender_id
        .split_once('@')
        .ok_or_else(|| format!("Malformed conversation address: {sender_id}"))?;
    id.parse::<i64>()
        .map(ChatId)
        .map_err(|e| format!("Malformed conversation address {sender_id}: {e}"))
}
