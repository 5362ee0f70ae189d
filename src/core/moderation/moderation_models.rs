// Moderation domain models - data structures for the contact filter.
//
// These are pure domain types with no storage or terminal dependencies.
// The outer layers decide how to show a verdict and where to keep attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default score a phrase must strictly exceed to block a message.
pub const DEFAULT_PHRASE_THRESHOLD: u8 = 80;

/// Longest normalized message (in chars) that gets fuzzy phrase scoring.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 1000;

/// Why a message was blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionCategory {
    /// A phone number, or a phrase asking for one
    Phone,
    /// An email address, or a phrase asking for one
    Email,
    /// A link to a social or meeting platform
    Url,
    /// A phrase naming a social platform
    SocialMedia,
    /// A phrase proposing to meet outside the platform
    ExternalMeeting,
    /// "راسلني" together with a social platform keyword
    ExternalContactRequest,
}

impl RestrictionCategory {
    /// Stable name used in storage and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RestrictionCategory::Phone => "phone",
            RestrictionCategory::Email => "email",
            RestrictionCategory::Url => "url",
            RestrictionCategory::SocialMedia => "social_media",
            RestrictionCategory::ExternalMeeting => "external_meeting",
            RestrictionCategory::ExternalContactRequest => "external_contact_request",
        }
    }

    /// Parse a name produced by [`RestrictionCategory::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "phone" => Some(RestrictionCategory::Phone),
            "email" => Some(RestrictionCategory::Email),
            "url" => Some(RestrictionCategory::Url),
            "social_media" => Some(RestrictionCategory::SocialMedia),
            "external_meeting" => Some(RestrictionCategory::ExternalMeeting),
            "external_contact_request" => Some(RestrictionCategory::ExternalContactRequest),
            _ => None,
        }
    }

    /// User-facing (Arabic) explanation shown in the composer.
    pub fn rejection_message(&self) -> &'static str {
        match self {
            RestrictionCategory::Phone => "لا يُسمح بمشاركة أرقام الهاتف داخل المحادثة",
            RestrictionCategory::Email => "لا يُسمح بمشاركة عناوين البريد الإلكتروني داخل المحادثة",
            RestrictionCategory::Url => "لا يُسمح بمشاركة روابط مواقع التواصل أو الاجتماعات",
            RestrictionCategory::SocialMedia => "لا يُسمح بنقل المحادثة إلى مواقع التواصل الاجتماعي",
            RestrictionCategory::ExternalMeeting => "لا يُسمح بترتيب لقاءات خارج المنصة",
            RestrictionCategory::ExternalContactRequest => {
                "لا يُسمح بطلب التواصل خارج المنصة"
            }
        }
    }
}

impl std::fmt::Display for RestrictionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of evaluating one candidate message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationVerdict {
    /// Whether the message must not be sent
    pub is_restricted: bool,
    /// Human-readable reason, empty when allowed
    pub reason: String,
    /// Which rule fired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<RestrictionCategory>,
    /// The matched text or phrase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
    /// Fuzzy score, only set when a catalog phrase fired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

impl ModerationVerdict {
    /// Create an "allowed" verdict.
    pub fn allowed() -> Self {
        Self {
            is_restricted: false,
            reason: String::new(),
            category: None,
            matched: None,
            score: None,
        }
    }

    /// Create a "blocked" verdict.
    pub fn restricted(category: RestrictionCategory, matched: impl Into<String>) -> Self {
        let matched = matched.into();
        let reason = if matched.is_empty() {
            category.rejection_message().to_string()
        } else {
            format!("{} («{}»)", category.rejection_message(), matched)
        };

        Self {
            is_restricted: true,
            reason,
            category: Some(category),
            matched: Some(matched),
            score: None,
        }
    }

    /// Attach the fuzzy score that produced this verdict.
    pub fn with_score(mut self, score: u8) -> Self {
        self.score = Some(score);
        self
    }
}

/// Filter configuration, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardConfig {
    /// A phrase must score strictly above this (0-100) to block
    pub phrase_threshold: u8,
    /// Optional JSON file overriding the built-in phrase catalog
    pub phrases_file: Option<String>,
    /// SQLite file for blocked attempts
    pub database_path: String,
    /// Blocked attempts older than this many days are purged
    pub retention_days: u32,
    /// Longer messages only match catalog phrases exactly
    pub max_message_chars: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            phrase_threshold: DEFAULT_PHRASE_THRESHOLD,
            phrases_file: None,
            database_path: "data/moderation.db".to_string(),
            retention_days: 90,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }
}

impl GuardConfig {
    /// Build a config from `MODERATION_*` environment variables.
    ///
    /// Unparseable values are logged and replaced by their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let phrase_threshold = match std::env::var("MODERATION_THRESHOLD") {
            Ok(raw) => match raw.trim().parse::<u8>() {
                Ok(value) if value <= 100 => value,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        "Invalid MODERATION_THRESHOLD, using {}",
                        defaults.phrase_threshold
                    );
                    defaults.phrase_threshold
                }
            },
            Err(_) => defaults.phrase_threshold,
        };

        let phrases_file = std::env::var("MODERATION_PHRASES_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty());

        let database_path =
            std::env::var("MODERATION_DB_PATH").unwrap_or(defaults.database_path);

        let retention_days = std::env::var("MODERATION_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(defaults.retention_days);

        let max_message_chars = std::env::var("MODERATION_MAX_MESSAGE_CHARS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|chars| *chars > 0)
            .unwrap_or(defaults.max_message_chars);

        Self {
            phrase_threshold,
            phrases_file,
            database_path,
            retention_days,
            max_message_chars,
        }
    }
}

/// A message that was blocked before reaching the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedAttempt {
    pub sender_id: u64,
    pub conversation_id: u64,
    pub content: String,
    pub category: RestrictionCategory,
    pub reason: String,
    pub score: Option<u8>,
    pub attempted_at: DateTime<Utc>,
}
