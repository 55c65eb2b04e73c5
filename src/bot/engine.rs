//! Runs the full pipeline for one inbound message: resolve the sender,
//! classify, generate a reply, pace it out and send it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::bot::message::{ContactInfo, InboundMessage};
use crate::bot::transport::Transport;
use crate::classifier::Classifier;
use crate::composer::{Composer, split_into_messages};
use crate::scheduler::{Delay, ReplyScheduler};

/// Typing simulation speed.
const TYPING_MS_PER_CHAR: u64 = 75;
/// Upper bound for one simulated typing burst.
const TYPING_CAP: Duration = Duration::from_secs(6);

/// Behavior switches, snapshotted from config at startup.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub simulate_typing: bool,
    pub dry_run: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            simulate_typing: true,
            dry_run: false,
        }
    }
}

pub struct Engine {
    classifier: Classifier,
    composer: Composer,
    scheduler: ReplyScheduler,
    transport: Arc<dyn Transport>,
    options: EngineOptions,
}

impl Engine {
    pub fn new(
        classifier: Classifier,
        composer: Composer,
        scheduler: ReplyScheduler,
        transport: Arc<dyn Transport>,
        options: EngineOptions,
    ) -> Self {
        Self {
            classifier,
            composer,
            scheduler,
            transport,
            options,
        }
    }

    /// Handle one inbound message end to end. Never returns an error; every
    /// failure is logged and the event is dropped, the next message starts
    /// from a clean slate.
    pub async fn handle_message(&self, msg: InboundMessage) {
        let contact = match self.transport.resolve_contact(&msg.sender_id).await {
            Ok(contact) => contact,
            Err(e) => {
                warn!("Contact lookup failed for {}: {e}", msg.sender_id);
                ContactInfo::placeholder(&msg.sender_id)
            }
        };

        let result = self.classifier.classify(&msg.text, &msg.sender_id);
        let preview: String = msg.text.chars().take(100).collect();
        info!(
            "📩 {} ({}): \"{preview}\" → match={} confidence={:.2} ({})",
            contact.display_name, msg.sender_id, result.is_match, result.confidence, result.reason
        );

        if !result.is_match {
            return;
        }
        if let Some(pattern) = result.matched_pattern {
            info!("🎂 birthday greeting detected: {pattern}");
        }

        let ctx = self
            .classifier
            .extract_context(&msg.text, &msg.sender_id, contact);

        let reply = match self.composer.compose(&ctx).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Reply generation failed: {e}");
                return;
            }
        };
        info!("💬 reply: \"{reply}\"");

        self.scheduler
            .wait(Delay::Contextual {
                message_len: ctx.length,
            })
            .await;

        let parts = split_into_messages(&reply);
        let total = parts.len();
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                continue;
            }

            if self.options.dry_run {
                info!("[DRY RUN] Would send to {}: \"{part}\"", msg.sender_id);
            } else {
                if self.options.simulate_typing {
                    self.transport.send_typing(&msg.sender_id).await.ok();
                    tokio::time::sleep(typing_duration(part.chars().count())).await;
                }
                match self.transport.send_text(&msg.sender_id, part).await {
                    Ok(()) => info!("✅ reply part {}/{total} sent", i + 1),
                    Err(e) => warn!("Failed to send reply part {}/{total}: {e}", i + 1),
                }
            }

            if i + 1 < total {
                self.scheduler.wait(Delay::Quick).await;
            }
        }
    }
}

/// How long a person plausibly spends typing `chars` characters.
fn typing_duration(chars: usize) -> Duration {
    Duration::from_millis((chars as u64).saturating_mul(TYPING_MS_PER_CHAR)).min(TYPING_CAP)
}
