//! Birthday greeting classifier.
//!
//! Table-driven: an ordered list of pattern+description entries decides the
//! match, a second ordered rule list decides the confidence level. Takes
//! plain text and a sender address, never touches the transport.

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::bot::message::ContactInfo;

/// Celebration emoji recognized by the pattern table and the emoji bonus.
const CELEBRATION_EMOJI: &str = "🎂🎉🎊🎈🎁🥳🎆🎇";

/// Sender-address fragments that mark broadcast/status channels.
const BROADCAST_MARKERS: [&str; 2] = ["@broadcast", "status"];

/// Messages shorter than this (after trimming) are never classified.
const MIN_MESSAGE_CHARS: usize = 2;

const BASE_CONFIDENCE: f64 = 0.6;
const EMOJI_BONUS: f64 = 0.10;
const LONG_MESSAGE_BONUS: f64 = 0.05;
/// Trimmed length above which a greeting counts as personalized.
const LONG_MESSAGE_CHARS: usize = 15;

/// Outcome of classifying one message. Derived value, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub is_match: bool,
    /// In [0, 1]. Informational only; nothing downstream branches on it.
    pub confidence: f64,
    pub matched_pattern: Option<&'static str>,
    pub reason: &'static str,
}

impl ClassificationResult {
    fn negative(reason: &'static str) -> Self {
        Self {
            is_match: false,
            confidence: 0.0,
            matched_pattern: None,
            reason,
        }
    }
}

/// Everything the composer needs to know about a classified message.
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub sender_id: String,
    pub contact: ContactInfo,
    pub text: String,
    /// Length in chars of the raw body.
    pub length: usize,
    pub has_emoji: bool,
    pub is_formal: bool,
    pub timestamp: DateTime<Utc>,
}

/// One entry in the ordered greeting table.
struct GreetingPattern {
    regex: Regex,
    description: &'static str,
}

/// One entry in the ordered confidence-level table.
struct ConfidenceLevel {
    regex: Regex,
    confidence: f64,
}

pub struct Classifier {
    /// Ordered; the first matching entry wins.
    patterns: Vec<GreetingPattern>,
    /// Ordered; the first matching entry sets the level, else the base.
    levels: Vec<ConfidenceLevel>,
    celebration: Regex,
    formal: Regex,
}

impl Classifier {
    pub fn new() -> Self {
        let patterns = [
            // Multi-word birthday phrases, highest priority.
            (
                r"\b(?:feliz\s+cumpleaños?|feliz\s+cumple)\b",
                "explicit happy-birthday phrase",
            ),
            (
                r"\bfelicidades\s+(?:en\s+)?(?:tu\s+)?día\b",
                "congratulations on your day",
            ),
            (
                r"\bque\s+tengas\s+un\s+feliz\s+cumpleaños?\b",
                "wish for a happy birthday",
            ),
            (
                r"\bque\s+la\s+pases\s+(?:super|bien)\s+en\s+tu\s+día\b",
                "wish for a great day",
            ),
            (r"\bque\s+disfrutes\s+tu\s+día\b", "wish to enjoy your day"),
            // The single word "happy" and its stretched spelling.
            (r"\bfelizz?\b", "the word happy"),
            // The word "birthday" and its informal spellings.
            (r"\b(?:cumpleaños?|cumplee?)\b", "the word birthday"),
        ];

        let mut patterns: Vec<GreetingPattern> = patterns
            .into_iter()
            .map(|(pattern, description)| GreetingPattern {
                regex: Regex::new(pattern).unwrap(),
                description,
            })
            .collect();

        // Celebration emoji, tested as one disjunction at the end.
        let celebration = Regex::new(&format!("[{CELEBRATION_EMOJI}]")).unwrap();
        patterns.push(GreetingPattern {
            regex: celebration.clone(),
            description: "celebration emoji",
        });

        let levels = [
            (r"\b(?:feliz\s+cumpleaños?|feliz\s+cumple)\b", 0.95),
            (r"\bfelicidades\b", 0.9),
            (r"\bfeliz\b", 0.8),
        ]
        .into_iter()
        .map(|(pattern, confidence)| ConfidenceLevel {
            regex: Regex::new(pattern).unwrap(),
            confidence,
        })
        .collect();

        let formal =
            Regex::new(r"(?i)\busted\b|\bseñora?\b|\bpor\s+favor\b|\bgracias\b").unwrap();

        Self {
            patterns,
            levels,
            celebration,
            formal,
        }
    }

    /// Classify one message. Never fails; malformed input is a negative.
    pub fn classify(&self, text: &str, sender_id: &str) -> ClassificationResult {
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_MESSAGE_CHARS {
            return ClassificationResult::negative("message too short or empty");
        }

        if BROADCAST_MARKERS
            .iter()
            .any(|marker| sender_id.contains(marker))
        {
            return ClassificationResult::negative("broadcast or status sender");
        }

        let lowered = trimmed.to_lowercase();

        for pattern in &self.patterns {
            if pattern.regex.is_match(&lowered) {
                return ClassificationResult {
                    is_match: true,
                    confidence: self.score(&lowered),
                    matched_pattern: Some(pattern.description),
                    reason: "birthday pattern matched",
                };
            }
        }

        ClassificationResult::negative("not a birthday message")
    }

    /// Confidence for an already-established match.
    fn score(&self, lowered: &str) -> f64 {
        let mut confidence = self
            .levels
            .iter()
            .find(|level| level.regex.is_match(lowered))
            .map(|level| level.confidence)
            .unwrap_or(BASE_CONFIDENCE);

        if self.celebration.is_match(lowered) {
            confidence += EMOJI_BONUS;
        }
        if lowered.chars().count() > LONG_MESSAGE_CHARS {
            confidence += LONG_MESSAGE_BONUS;
        }

        confidence.clamp(0.0, 1.0)
    }

    /// Assemble the composer-facing context for one message. Independent of
    /// classification outcome; the engine only calls it on positives.
    pub fn extract_context(
        &self,
        text: &str,
        sender_id: &str,
        contact: ContactInfo,
    ) -> MessageContext {
        MessageContext {
            sender_id: sender_id.to_string(),
            contact,
            text: text.to_string(),
            length: text.chars().count(),
            has_emoji: self.celebration.is_match(text),
            is_formal: self.formal.is_match(text),
            timestamp: Utc::now(),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
