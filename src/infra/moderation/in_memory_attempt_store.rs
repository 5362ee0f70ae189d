// In-memory implementation of BlockedAttemptStore.
//
// Used when the SQLite file cannot be opened, and in tests. Attempts are
// lost when the process exits.

use crate::core::moderation::{BlockedAttempt, BlockedAttemptStore, ModerationError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Attempts keyed by an increasing sequence number, so "most recent" is
/// simply the highest key.
pub struct InMemoryAttemptStore {
    next_seq: AtomicU64,
    attempts: DashMap<u64, BlockedAttempt>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self {
            next_seq: AtomicU64::new(1),
            attempts: DashMap::new(),
        }
    }
}

impl Default for InMemoryAttemptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockedAttemptStore for InMemoryAttemptStore {
    async fn record_attempt(&self, attempt: BlockedAttempt) -> Result<(), ModerationError> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.attempts.insert(seq, attempt);
        Ok(())
    }

    async fn recent_attempts(&self, limit: usize) -> Result<Vec<BlockedAttempt>, ModerationError> {
        let mut entries: Vec<(u64, BlockedAttempt)> = self
            .attempts
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        // Highest sequence number first
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        entries.truncate(limit);

        Ok(entries.into_iter().map(|(_, attempt)| attempt).collect())
    }

    async fn count_for_sender(&self, sender_id: u64) -> Result<u64, ModerationError> {
        Ok(self
            .attempts
            .iter()
            .filter(|entry| entry.value().sender_id == sender_id)
            .count() as u64)
    }

    async fn cleanup_old_records(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<u64, ModerationError> {
        let before = self.attempts.len();
        self.attempts
            .retain(|_, attempt| attempt.attempted_at >= older_than);
        Ok(before.saturating_sub(self.attempts.len()) as u64)
    }
}
