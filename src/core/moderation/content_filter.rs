// Content filter - combines the pattern checks and the phrase matcher into
// one verdict. Pure: no I/O, no shared mutable state.

use super::contact_patterns::PatternSet;
use super::moderation_models::{GuardConfig, ModerationVerdict};
use super::phrase_catalog::PhraseCatalog;
use super::phrase_matcher::PhraseMatcher;

/// Decides whether a message may be sent.
///
/// Immutable once built, so one instance can be shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    patterns: PatternSet,
    phrases: PhraseMatcher,
}

impl ContentFilter {
    /// Build the filter described by `config`, loading the catalog override
    /// file if one is set.
    pub fn from_config(config: &GuardConfig) -> Self {
        let catalog = PhraseCatalog::load_or_builtin(config.phrases_file.as_deref());
        Self {
            patterns: PatternSet::new(),
            phrases: PhraseMatcher::new(&catalog, config.phrase_threshold)
                .with_max_message_chars(config.max_message_chars),
        }
    }

    /// Evaluate one candidate message.
    ///
    /// Patterns run first on the raw text (phone, email, url); the first hit
    /// wins and phrase matching is skipped. Otherwise the phrase matcher
    /// runs on the normalized text.
    pub fn evaluate(&self, message: &str) -> ModerationVerdict {
        if message.trim().is_empty() {
            return ModerationVerdict::allowed();
        }

        if let Some(hit) = self.patterns.first_hit(message) {
            return ModerationVerdict::restricted(hit.category, hit.matched);
        }

        self.phrases
            .check(message)
            .unwrap_or_else(ModerationVerdict::allowed)
    }

    /// Evaluate a message that may be missing.
    #[allow(dead_code)] // Entry point for callers holding optional payloads
    pub fn evaluate_optional(&self, message: Option<&str>) -> ModerationVerdict {
        message.map_or_else(ModerationVerdict::allowed, |m| self.evaluate(m))
    }

    /// Evaluate a raw payload; invalid UTF-8 is decoded lossily.
    #[allow(dead_code)] // Entry point for callers holding raw bytes
    pub fn evaluate_bytes(&self, bytes: &[u8]) -> ModerationVerdict {
        self.evaluate(&String::from_utf8_lossy(bytes))
    }

    pub fn threshold(&self) -> u8 {
        self.phrases.threshold()
    }
}
