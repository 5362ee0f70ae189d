// Phrase catalog - the curated list of phrases that signal an attempt to
// move the conversation off the platform.
//
// The built-in lists are static tables. A JSON file can replace them at
// startup; after that the catalog is never mutated.

use super::moderation_models::RestrictionCategory;
use super::moderation_service::ModerationError;
use serde::{Deserialize, Serialize};
use std::path::Path;

const PHONE_PHRASES: &[&str] = &[
    "رقم هاتفك",
    "أعطني رقمك",
    "رقم الهاتف",
    "اتصل بي",
    "كلمني على الرقم",
    "numéro de téléphone",
    "appelle-moi",
    "mon numéro",
    "ton numéro",
    "phone number",
];

const SOCIAL_MEDIA_PHRASES: &[&str] = &[
    "واتساب",
    "واتس اب",
    "فيسبوك",
    "انستغرام",
    "انستقرام",
    "تيليجرام",
    "تلغرام",
    "سناب شات",
    "تيك توك",
    "لينكد إن",
    "ماسنجر",
    "فايبر",
    "whatsapp",
    "facebook",
    "instagram",
    "telegram",
    "snapchat",
    "messenger",
    "viber",
];

const EMAIL_PHRASES: &[&str] = &[
    "بريدي الإلكتروني",
    "البريد الإلكتروني",
    "الإيميل",
    "إيميلي",
    "adresse e-mail",
    "adresse mail",
    "mon email",
    "mon mail",
];

const EXTERNAL_MEETING_PHRASES: &[&str] = &[
    "لنلتق خارج المنصة",
    "نتقابل خارج الموقع",
    "خارج المنصة",
    "مكالمة زوم",
    "اجتماع على زوم",
    "جوجل ميت",
    "سكايب",
    "rendez-vous",
    "rencontrons-nous",
    "google meet",
    "skype",
    "zoom",
];

/// On-disk shape of a catalog override file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFile {
    pub phone: Vec<String>,
    pub social_media: Vec<String>,
    pub email: Vec<String>,
    pub external_meeting: Vec<String>,
}

/// Ordered phrases per category. Category order is phone, socialMedia,
/// email, externalMeeting, and it decides ties between equal scores.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseCatalog {
    groups: Vec<(RestrictionCategory, Vec<String>)>,
}

fn owned(phrases: &[&str]) -> Vec<String> {
    phrases.iter().map(|p| p.to_string()).collect()
}

impl PhraseCatalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Self {
        Self::from_groups(vec![
            (RestrictionCategory::Phone, owned(PHONE_PHRASES)),
            (RestrictionCategory::SocialMedia, owned(SOCIAL_MEDIA_PHRASES)),
            (RestrictionCategory::Email, owned(EMAIL_PHRASES)),
            (RestrictionCategory::ExternalMeeting, owned(EXTERNAL_MEETING_PHRASES)),
        ])
    }

    /// Build a catalog from explicit groups. Blank phrases are dropped.
    pub fn from_groups(groups: Vec<(RestrictionCategory, Vec<String>)>) -> Self {
        let groups = groups
            .into_iter()
            .map(|(category, phrases)| {
                let phrases = phrases
                    .into_iter()
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect();
                (category, phrases)
            })
            .collect();
        Self { groups }
    }

    /// Parse a JSON catalog (see [`CatalogFile`]).
    pub fn from_json(json: &str) -> Result<Self, ModerationError> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| ModerationError::CatalogError(e.to_string()))?;

        let catalog = Self::from_groups(vec![
            (RestrictionCategory::Phone, file.phone),
            (RestrictionCategory::SocialMedia, file.social_media),
            (RestrictionCategory::Email, file.email),
            (RestrictionCategory::ExternalMeeting, file.external_meeting),
        ]);

        if catalog.is_empty() {
            return Err(ModerationError::CatalogError(
                "catalog contains no phrases".to_string(),
            ));
        }
        Ok(catalog)
    }

    /// Read a JSON catalog from disk.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ModerationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ModerationError::CatalogError(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Load the override file if one is configured, otherwise the built-in
    /// catalog. A broken override file is logged and ignored.
    pub fn load_or_builtin(path: Option<&str>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };

        match Self::load_from_file(path) {
            Ok(catalog) => {
                tracing::info!(path, phrases = catalog.len(), "Loaded phrase catalog");
                catalog
            }
            Err(e) => {
                tracing::warn!("Failed to load phrase catalog, using built-in list: {}", e);
                Self::builtin()
            }
        }
    }

    pub fn groups(&self) -> impl Iterator<Item = (RestrictionCategory, &[String])> {
        self.groups
            .iter()
            .map(|(category, phrases)| (*category, phrases.as_slice()))
    }

    pub fn phrases(&self, category: RestrictionCategory) -> &[String] {
        self.groups
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, phrases)| phrases.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of phrases across all categories.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, phrases)| phrases.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PhraseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
