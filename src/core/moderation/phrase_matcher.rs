// Phrase matcher - fuzzy comparison of a message against the catalog.

use super::fuzzy::best_window_score;
use super::moderation_models::{
    ModerationVerdict, RestrictionCategory, DEFAULT_MAX_MESSAGE_CHARS, DEFAULT_PHRASE_THRESHOLD,
};
use super::phrase_catalog::PhraseCatalog;
use super::text_normalizer::normalize;

/// "message me" - combined with a social platform keyword it is a request
/// to continue the conversation elsewhere.
const MESSAGE_ME_TOKEN: &str = "راسلني";

/// Shorter normalized messages ("ok", "في", "oui") skip fuzzy scoring.
const MIN_SCORED_MESSAGE_CHARS: usize = 4;

#[derive(Debug, Clone)]
struct PreparedPhrase {
    category: RestrictionCategory,
    original: String,
    normalized: String,
    chars: Vec<char>,
}

/// Best-scoring catalog phrase for a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseScore {
    pub category: RestrictionCategory,
    pub phrase: String,
    pub score: u8,
}

/// Catalog phrases, normalized once up front.
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    phrases: Vec<PreparedPhrase>,
    social_keywords: Vec<String>,
    threshold: u8,
    max_message_chars: usize,
}

impl PhraseMatcher {
    pub fn new(catalog: &PhraseCatalog, threshold: u8) -> Self {
        let phrases = catalog
            .groups()
            .flat_map(|(category, phrases)| {
                phrases.iter().map(move |phrase| {
                    let normalized = normalize(phrase);
                    PreparedPhrase {
                        category,
                        original: phrase.clone(),
                        chars: normalized.chars().collect(),
                        normalized,
                    }
                })
            })
            .filter(|p| !p.normalized.is_empty())
            .collect();

        let social_keywords = catalog
            .phrases(RestrictionCategory::SocialMedia)
            .iter()
            .map(|phrase| normalize(phrase))
            .filter(|keyword| !keyword.is_empty())
            .collect();

        Self {
            phrases,
            social_keywords,
            threshold,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }

    /// Messages longer than this (normalized chars) only match catalog
    /// phrases exactly.
    pub fn with_max_message_chars(mut self, max_message_chars: usize) -> Self {
        self.max_message_chars = max_message_chars;
        self
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Highest score strictly above `floor`. The first phrase in catalog
    /// order wins ties.
    fn best_above(&self, message: &[char], floor: u8) -> Option<PhraseScore> {
        let mut best: Option<PhraseScore> = None;
        for phrase in &self.phrases {
            let beat = best.as_ref().map_or(floor, |b| b.score);
            if let Some(score) = best_window_score(&phrase.chars, message, beat) {
                best = Some(PhraseScore {
                    category: phrase.category,
                    phrase: phrase.original.clone(),
                    score,
                });
                if score == 100 {
                    break;
                }
            }
        }
        best
    }

    /// First catalog phrase contained verbatim in the message.
    fn exact_match(&self, normalized_message: &str) -> Option<PhraseScore> {
        self.phrases
            .iter()
            .find(|p| normalized_message.contains(p.normalized.as_str()))
            .map(|p| PhraseScore {
                category: p.category,
                phrase: p.original.clone(),
                score: 100,
            })
    }

    /// Score a normalized message. `None` when nothing beats `floor`.
    fn score(&self, normalized_message: &str, floor: u8) -> Option<PhraseScore> {
        let message: Vec<char> = normalized_message.chars().collect();
        if message.len() < MIN_SCORED_MESSAGE_CHARS {
            return None;
        }

        if message.len() > self.max_message_chars {
            tracing::debug!(
                chars = message.len(),
                limit = self.max_message_chars,
                "Long message, phrase check limited to exact matches"
            );
            return self.exact_match(normalized_message).filter(|m| m.score > floor);
        }

        self.best_above(&message, floor)
    }

    /// "راسلني" plus any social keyword as an exact substring.
    pub fn is_external_contact_request(&self, normalized_message: &str) -> bool {
        normalized_message.contains(MESSAGE_ME_TOKEN)
            && self
                .social_keywords
                .iter()
                .any(|keyword| normalized_message.contains(keyword.as_str()))
    }

    /// Check a raw message against the catalog.
    ///
    /// The score path runs first; the "راسلني" heuristic runs after it and
    /// fires regardless of the score.
    pub fn check(&self, message: &str) -> Option<ModerationVerdict> {
        let normalized = normalize(message);
        if normalized.is_empty() {
            return None;
        }

        if let Some(best) = self.score(&normalized, self.threshold) {
            return Some(
                ModerationVerdict::restricted(best.category, best.phrase).with_score(best.score),
            );
        }

        if self.is_external_contact_request(&normalized) {
            return Some(ModerationVerdict::restricted(
                RestrictionCategory::ExternalContactRequest,
                MESSAGE_ME_TOKEN,
            ));
        }

        None
    }
}

impl Default for PhraseMatcher {
    fn default() -> Self {
        Self::new(&PhraseCatalog::builtin(), DEFAULT_PHRASE_THRESHOLD)
    }
}
