//! Randomized pacing so replies land like a person typed them, not a daemon.

use std::time::Duration;

use rand::Rng;
use tracing::info;

/// Inbound length at which the contextual window stops narrowing.
const SATURATION_CHARS: usize = 240;

/// Which wait is being scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    /// Before the first reply part. A longer greeting takes longer to read
    /// and answer, so the floor of the window rises with `message_len`.
    Contextual { message_len: usize },
    /// Between the two parts of a split reply.
    Quick,
}

#[derive(Debug, Clone)]
pub struct ReplyScheduler {
    min_seconds: u64,
    max_seconds: u64,
}

impl ReplyScheduler {
    /// Bounds come from config, already validated `min <= max`.
    pub fn new(min_seconds: u64, max_seconds: u64) -> Self {
        Self {
            min_seconds,
            max_seconds,
        }
    }

    /// Inclusive window a given delay draws from. Contextual raises the
    /// floor linearly with inbound length, topping out at half the span
    /// once the message reaches 240 chars. Always within `[min, max]`.
    pub fn bounds(&self, delay: Delay) -> (u64, u64) {
        match delay {
            Delay::Quick => (self.min_seconds, self.max_seconds),
            Delay::Contextual { message_len } => {
                let span = self.max_seconds - self.min_seconds;
                let capped = message_len.min(SATURATION_CHARS) as u128;
                let rise = (span as u128 * capped) / (2 * SATURATION_CHARS as u128);
                (self.min_seconds + rise as u64, self.max_seconds)
            }
        }
    }

    /// Uniform inclusive draw from the delay's window.
    pub fn pick_seconds(&self, delay: Delay) -> u64 {
        let (lo, hi) = self.bounds(delay);
        rand::rng().random_range(lo..=hi)
    }

    pub async fn wait(&self, delay: Delay) {
        let seconds = self.pick_seconds(delay);
        match delay {
            Delay::Contextual { .. } => {
                info!("⏰ waiting {seconds}s before replying");
            }
            Delay::Quick => {
                info!("⚡ quick wait of {seconds}s between reply parts");
            }
        }
        tokio::time::sleep(Duration::from_secs(seconds)).await;
    }
}
