// Moderation service - core business logic around the content filter.
//
// This service handles:
// - Screening outgoing messages with the ContentFilter
// - Recording blocked attempts through the store port
// - Reading back and purging the attempt log
//
// NO storage or terminal dependencies here - just pure domain logic.

use super::content_filter::ContentFilter;
use super::moderation_models::{BlockedAttempt, ModerationVerdict};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting blocked attempts.
#[async_trait]
pub trait BlockedAttemptStore: Send + Sync {
    /// Record one blocked message.
    async fn record_attempt(&self, attempt: BlockedAttempt) -> Result<(), ModerationError>;

    /// Most recent attempts first, at most `limit`.
    async fn recent_attempts(&self, limit: usize) -> Result<Vec<BlockedAttempt>, ModerationError>;

    /// Number of attempts recorded for a sender.
    async fn count_for_sender(&self, sender_id: u64) -> Result<u64, ModerationError>;

    /// Delete attempts older than `older_than`. Returns how many were removed.
    async fn cleanup_old_records(&self, older_than: DateTime<Utc>)
        -> Result<u64, ModerationError>;
}

// Lets the composition root pick a store at runtime behind one type.
#[async_trait]
impl<T: BlockedAttemptStore + ?Sized> BlockedAttemptStore for Arc<T> {
    async fn record_attempt(&self, attempt: BlockedAttempt) -> Result<(), ModerationError> {
        (**self).record_attempt(attempt).await
    }

    async fn recent_attempts(&self, limit: usize) -> Result<Vec<BlockedAttempt>, ModerationError> {
        (**self).recent_attempts(limit).await
    }

    async fn count_for_sender(&self, sender_id: u64) -> Result<u64, ModerationError> {
        (**self).count_for_sender(sender_id).await
    }

    async fn cleanup_old_records(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<u64, ModerationError> {
        (**self).cleanup_old_records(older_than).await
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Screens messages and keeps a log of what was blocked.
pub struct ModerationService<S: BlockedAttemptStore> {
    filter: Arc<ContentFilter>,
    store: S,
}

impl<S: BlockedAttemptStore> ModerationService<S> {
    /// Create a new moderation service with the given filter and store.
    pub fn new(filter: Arc<ContentFilter>, store: S) -> Self {
        Self { filter, store }
    }

    /// Evaluate without recording anything.
    pub fn evaluate(&self, content: &str) -> ModerationVerdict {
        self.filter.evaluate(content)
    }

    /// Screen a message before it is sent.
    ///
    /// A restricted verdict is written to the store. If the store fails the
    /// failure is logged and the verdict still stands.
    pub async fn screen(
        &self,
        sender_id: u64,
        conversation_id: u64,
        content: &str,
    ) -> ModerationVerdict {
        let verdict = self.filter.evaluate(content);

        let Some(category) = verdict.category.filter(|_| verdict.is_restricted) else {
            return verdict;
        };

        tracing::warn!(
            sender_id,
            conversation_id,
            category = %category,
            score = ?verdict.score,
            "Blocked off-platform contact attempt"
        );

        let attempt = BlockedAttempt {
            sender_id,
            conversation_id,
            content: content.to_string(),
            category,
            reason: verdict.reason.clone(),
            score: verdict.score,
            attempted_at: Utc::now(),
        };

        if let Err(e) = self.store.record_attempt(attempt).await {
            tracing::error!("Failed to record blocked attempt: {}", e);
        }

        verdict
    }

    /// Most recent blocked attempts.
    pub async fn recent_attempts(
        &self,
        limit: usize,
    ) -> Result<Vec<BlockedAttempt>, ModerationError> {
        self.store.recent_attempts(limit).await
    }

    /// How many times a sender has been blocked.
    pub async fn attempts_for_sender(&self, sender_id: u64) -> Result<u64, ModerationError> {
        self.store.count_for_sender(sender_id).await
    }

    /// Drop attempts older than the given instant.
    pub async fn purge_attempts_older_than(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<u64, ModerationError> {
        let removed = self.store.cleanup_old_records(older_than).await?;
        if removed > 0 {
            tracing::info!(removed, "Purged old blocked attempts");
        }
        Ok(removed)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::RestrictionCategory;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    /// In-memory store for testing
    struct MockAttemptStore {
        next_id: AtomicU64,
        attempts: DashMap<u64, BlockedAttempt>,
        fail_writes: AtomicBool,
    }

    impl MockAttemptStore {
        fn new() -> Self {
            Self {
                next_id: AtomicU64::new(0),
                attempts: DashMap::new(),
                fail_writes: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl BlockedAttemptStore for MockAttemptStore {
        async fn record_attempt(&self, attempt: BlockedAttempt) -> Result<(), ModerationError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ModerationError::StorageError("disk full".to_string()));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.attempts.insert(id, attempt);
            Ok(())
        }

        async fn recent_attempts(
            &self,
            limit: usize,
        ) -> Result<Vec<BlockedAttempt>, ModerationError> {
            let mut entries: Vec<(u64, BlockedAttempt)> = self
                .attempts
                .iter()
                .map(|e| (*e.key(), e.value().clone()))
                .collect();
            entries.sort_by(|a, b| b.0.cmp(&a.0));
            Ok(entries.into_iter().take(limit).map(|(_, a)| a).collect())
        }

        async fn count_for_sender(&self, sender_id: u64) -> Result<u64, ModerationError> {
            Ok(self
                .attempts
                .iter()
                .filter(|e| e.value().sender_id == sender_id)
                .count() as u64)
        }

        async fn cleanup_old_records(
            &self,
            older_than: DateTime<Utc>,
        ) -> Result<u64, ModerationError> {
            let before = self.attempts.len();
            self.attempts.retain(|_, a| a.attempted_at >= older_than);
            Ok((before - self.attempts.len()) as u64)
        }
    }

    fn service() -> ModerationService<MockAttemptStore> {
        ModerationService::new(Arc::new(ContentFilter::default()), MockAttemptStore::new())
    }

    #[tokio::test]
    async fn test_clean_message_not_recorded() {
        let service = service();

        let verdict = service.screen(1, 10, "هل يمكن تأجير المعدات لمدة سنة؟").await;

        assert!(!verdict.is_restricted);
        assert_eq!(service.attempts_for_sender(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blocked_message_recorded() {
        let service = service();

        let verdict = service.screen(7, 10, "اتصل بي على 0551234567").await;
        assert!(verdict.is_restricted);

        let attempts = service.recent_attempts(10).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].sender_id, 7);
        assert_eq!(attempts[0].conversation_id, 10);
        assert_eq!(attempts[0].category, RestrictionCategory::Phone);
        assert_eq!(attempts[0].reason, verdict.reason);
    }

    #[tokio::test]
    async fn test_recent_attempts_newest_first() {
        let service = service();

        service.screen(1, 10, "karim@mail.com").await;
        service.screen(2, 10, "https://t.me/karim").await;
        service.screen(1, 11, "راسلني على واتساب من فضلك").await;

        let attempts = service.recent_attempts(2).await.unwrap();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].conversation_id, 11);
        assert_eq!(attempts[1].category, RestrictionCategory::Url);

        assert_eq!(service.attempts_for_sender(1).await.unwrap(), 2);
        assert_eq!(service.attempts_for_sender(2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_verdict() {
        let store = MockAttemptStore::new();
        store.fail_writes.store(true, Ordering::SeqCst);
        let service = ModerationService::new(Arc::new(ContentFilter::default()), store);

        let verdict = service.screen(1, 10, "+33612345678").await;

        assert!(verdict.is_restricted);
        assert_eq!(service.attempts_for_sender(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_old_attempts() {
        let service = service();
        service.screen(1, 10, "karim@mail.com").await;

        let removed = service
            .purge_attempts_older_than(Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        let removed = service
            .purge_attempts_older_than(Utc::now() + chrono::Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(service.recent_attempts(10).await.unwrap().is_empty());
    }
}
