// Regex checks for contact details pasted straight into a message.
//
// These run against the RAW message (not normalized) so digits, `@` and
// domains are seen exactly as typed.

use super::moderation_models::RestrictionCategory;
use once_cell::sync::Lazy;
use regex::Regex;

/// Algerian (+213) or French (+33) numbers, or a national number with a
/// leading 0, followed by 9 digits. Single space/dot/dash separators allowed.
/// `\d` is Unicode-aware, so Arabic-Indic digits count too. The number must
/// not touch other digits on either side; group 1 is the number itself.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d+])((?:\+213|\+33|[0٠])[ .\-]?\d(?:[ .\-]?\d){8})(?:$|\D)")
        .expect("phone regex is valid")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("email regex is valid")
});

/// Social and meeting platforms whose links are not allowed.
const BLOCKED_DOMAINS: &[&str] = &[
    "wa.me",
    "whatsapp.com",
    "facebook.com",
    "fb.com",
    "fb.me",
    "m.me",
    "messenger.com",
    "instagram.com",
    "t.me",
    "telegram.me",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "snapchat.com",
    "tiktok.com",
    "viber.com",
    "discord.gg",
    "discord.com",
    "skype.com",
    "zoom.us",
    "meet.google.com",
    "teams.microsoft.com",
];

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    let domains = BLOCKED_DOMAINS
        .iter()
        .map(|domain| regex::escape(domain))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)(?:https?://)?(?:www\.)?\b(?:{})\b", domains))
        .expect("url regex is valid")
});

/// A pattern that fired, with the text it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternHit {
    pub category: RestrictionCategory,
    pub matched: String,
}

/// The fixed phone / email / url checks, in priority order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternSet;

impl PatternSet {
    pub fn new() -> Self {
        Self
    }

    fn find_phone(message: &str) -> Option<&str> {
        PHONE_RE
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// First hit in phone -> email -> url order, if any.
    pub fn first_hit(&self, message: &str) -> Option<PatternHit> {
        let hit = |category: RestrictionCategory, matched: &str| PatternHit {
            category,
            matched: matched.to_string(),
        };

        if let Some(phone) = Self::find_phone(message) {
            return Some(hit(RestrictionCategory::Phone, phone));
        }
        if let Some(email) = EMAIL_RE.find(message) {
            return Some(hit(RestrictionCategory::Email, email.as_str()));
        }
        URL_RE
            .find(message)
            .map(|url| hit(RestrictionCategory::Url, url.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone(message: &str) -> Option<&str> {
        PatternSet::find_phone(message)
    }

    #[test]
    fn test_algerian_numbers() {
        assert_eq!(phone("0551234567"), Some("0551234567"));
        assert_eq!(phone("+213551234567"), Some("+213551234567"));
        assert_eq!(phone("+213 551 23 45 67"), Some("+213 551 23 45 67"));
        assert_eq!(phone("اتصل بي على 0661-23-45-67"), Some("0661-23-45-67"));
        assert_eq!(phone("رقمي ٠٥٥١٢٣٤٥٦٧"), Some("٠٥٥١٢٣٤٥٦٧"));
    }

    #[test]
    fn test_french_numbers() {
        assert_eq!(phone("+33612345678"), Some("+33612345678"));
        assert_eq!(phone("+33 6 12 34 56 78"), Some("+33 6 12 34 56 78"));
        assert_eq!(phone("appelle le 06.12.34.56.78."), Some("06.12.34.56.78"));
    }

    #[test]
    fn test_short_numbers_are_not_phones() {
        assert!(phone("المبلغ 500000 دينار").is_none());
        assert!(phone("0551 23").is_none());
        assert!(phone("سنة 2024").is_none());
    }

    #[test]
    fn test_long_digit_runs_are_not_phones() {
        assert!(phone("المبلغ 10000000000 دينار").is_none());
        assert!(phone("IBAN FR7630006000011234567890189").is_none());
        assert!(phone("رقم الطلب 120551234567").is_none());
        assert!(phone("05512345678").is_none());
        assert!(phone("٠٥٥١٢٣٤٥٦٧٨").is_none());
    }

    #[test]
    fn test_email() {
        assert!(EMAIL_RE.is_match("راسلني karim.b@gmail.com"));
        assert!(EMAIL_RE.is_match("contact+projet@startup.dz"));
        assert!(!EMAIL_RE.is_match("karim at gmail"));
        assert!(!EMAIL_RE.is_match("@startup"));
    }

    #[test]
    fn test_platform_urls() {
        assert!(URL_RE.is_match("https://wa.me/213551234567"));
        assert!(URL_RE.is_match("www.facebook.com/karim"));
        assert!(URL_RE.is_match("t.me/karim_dz"));
        assert!(URL_RE.is_match("HTTPS://ZOOM.US/j/123"));
        assert!(URL_RE.is_match("meet.google.com/abc-defg-hij"));
        assert!(!URL_RE.is_match("https://example.com/projet"));
        assert!(!URL_RE.is_match("dropbox.com/s/file"));
    }

    #[test]
    fn test_priority_order() {
        let patterns = PatternSet::new();

        let hit = patterns
            .first_hit("karim@mail.com ou 0551234567")
            .expect("should hit");
        assert_eq!(hit.category, RestrictionCategory::Phone);
        assert_eq!(hit.matched, "0551234567");

        let hit = patterns
            .first_hit("https://wa.me/x et karim@mail.com")
            .expect("should hit");
        assert_eq!(hit.category, RestrictionCategory::Email);

        let hit = patterns.first_hit("https://wa.me/213551234567").expect("should hit");
        assert_eq!(hit.category, RestrictionCategory::Url);

        assert!(patterns.first_hit("مرحبا بكم").is_none());
    }
}
