pub mod in_memory_attempt_store;
pub mod sqlite_attempt_store;

pub use in_memory_attempt_store::InMemoryAttemptStore;
pub use sqlite_attempt_store::SqliteAttemptStore;
