// Core moderation module - contains the off-platform contact filter.
// Following the same pattern as the messaging module.

pub mod contact_patterns;
pub mod content_filter;
pub mod fuzzy;
pub mod moderation_models;
pub mod moderation_service;
pub mod phrase_catalog;
pub mod phrase_matcher;
pub mod text_normalizer;

pub use content_filter::*;
pub use moderation_models::*;
pub use moderation_service::*;
