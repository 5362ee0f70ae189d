// This is the entry point of the message composer.
//
// **Architecture Overview:**
// - `core/` = Business logic (content filter, moderation, messaging)
// - `infra/` = Implementations of core traits (SQLite, in-memory)
// - `cli/` = Terminal adapter (commands, composer loop)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Start background maintenance
// 4. Hand stdin over to the composer

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "cli/cli_layer.rs"]
mod cli;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::cli::Composer;
use crate::core::messaging::MessagingService;
use crate::core::moderation::{BlockedAttemptStore, ContentFilter, GuardConfig, ModerationService};
use crate::infra::messaging::InMemoryConversationStore;
use crate::infra::moderation::{InMemoryAttemptStore, SqliteAttemptStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = GuardConfig::from_env();
    tracing::info!(
        database = %config.database_path,
        "Starting message guard"
    );

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    // The filter is immutable after this point and shared by every service.
    let filter = Arc::new(ContentFilter::from_config(&config));
    tracing::info!(
        threshold = filter.threshold(),
        max_message_chars = config.max_message_chars,
        "Content filter ready"
    );

    // Blocked attempts go to SQLite; if the file can't be opened we keep
    // them in memory rather than refusing to start.
    let attempt_store: Arc<dyn BlockedAttemptStore> =
        match SqliteAttemptStore::open(&config.database_path).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::warn!(
                    "Failed to open attempt database, blocked attempts will not persist: {}",
                    e
                );
                Arc::new(InMemoryAttemptStore::new())
            }
        };

    let moderation = Arc::new(ModerationService::new(filter, attempt_store));
    let messaging = Arc::new(MessagingService::new(
        InMemoryConversationStore::new(),
        Arc::clone(&moderation),
    ));

    // ========================================================================
    // BACKGROUND MAINTENANCE
    // ========================================================================
    // Purge old blocked attempts once a day.
    let retention = chrono::Duration::days(i64::from(config.retention_days));
    let purge_moderation = Arc::clone(&moderation);
    tokio::spawn(async move {
        use std::time::Duration as StdDuration;
        use tokio::time::sleep;

        loop {
            let cutoff = chrono::Utc::now() - retention;
            if let Err(e) = purge_moderation.purge_attempts_older_than(cutoff).await {
                tracing::warn!("Blocked attempt purge failed: {}", e);
            }

            sleep(StdDuration::from_secs(60 * 60 * 24)).await;
        }
    });

    Composer::new(messaging).run().await
}
