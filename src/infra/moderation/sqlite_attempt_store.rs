// SQLite-backed store for blocked message attempts.
//
// Tables:
// - blocked_attempts: one row per message the filter refused

use crate::core::moderation::{
    BlockedAttempt, BlockedAttemptStore, ModerationError, RestrictionCategory,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;

pub struct SqliteAttemptStore {
    pool: Pool<Sqlite>,
}

impl SqliteAttemptStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database file at `path` and migrate it.
    pub async fn open(path: &str) -> Result<Self, ModerationError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ModerationError::StorageError(e.to_string()))?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path))
            .map_err(|e| ModerationError::StorageError(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ModerationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blocked_attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id INTEGER NOT NULL,
                conversation_id INTEGER NOT NULL,
                content TEXT NOT NULL,
                category TEXT NOT NULL,
                reason TEXT NOT NULL,
                score INTEGER,
                attempted_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_blocked_attempts_sender
                ON blocked_attempts(sender_id, attempted_at)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl BlockedAttemptStore for SqliteAttemptStore {
    async fn record_attempt(&self, attempt: BlockedAttempt) -> Result<(), ModerationError> {
        sqlx::query(
            r#"
            INSERT INTO blocked_attempts
                (sender_id, conversation_id, content, category, reason, score, attempted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(attempt.sender_id as i64)
        .bind(attempt.conversation_id as i64)
        .bind(&attempt.content)
        .bind(attempt.category.as_str())
        .bind(&attempt.reason)
        .bind(attempt.score.map(i64::from))
        .bind(attempt.attempted_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;
        Ok(())
    }

    async fn recent_attempts(&self, limit: usize) -> Result<Vec<BlockedAttempt>, ModerationError> {
        let rows = sqlx::query(
            r#"
            SELECT sender_id, conversation_id, content, category, reason, score, attempted_at
            FROM blocked_attempts
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        let mut attempts = Vec::with_capacity(rows.len());
        for row in rows {
            let category_name: String = row.get("category");
            let Some(category) = RestrictionCategory::from_name(&category_name) else {
                tracing::warn!(category = %category_name, "Skipping attempt with unknown category");
                continue;
            };

            let attempted_at_str: String = row.get("attempted_at");
            let Ok(attempted_at) = DateTime::parse_from_rfc3339(&attempted_at_str)
                .map(|dt| dt.with_timezone(&Utc))
            else {
                tracing::warn!(
                    attempted_at = %attempted_at_str,
                    "Skipping attempt with unparseable timestamp"
                );
                continue;
            };

            attempts.push(BlockedAttempt {
                sender_id: row.get::<i64, _>("sender_id") as u64,
                conversation_id: row.get::<i64, _>("conversation_id") as u64,
                content: row.get("content"),
                category,
                reason: row.get("reason"),
                score: row
                    .get::<Option<i64>, _>("score")
                    .and_then(|s| u8::try_from(s).ok()),
                attempted_at,
            });
        }
        Ok(attempts)
    }

    async fn count_for_sender(&self, sender_id: u64) -> Result<u64, ModerationError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM blocked_attempts WHERE sender_id = ?")
            .bind(sender_id as i64)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(row.get::<i64, _>("total") as u64)
    }

    async fn cleanup_old_records(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<u64, ModerationError> {
        let result = sqlx::query("DELETE FROM blocked_attempts WHERE attempted_at < ?")
            .bind(older_than.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
