//! Persisted reminder list the scheduler polls once per tick.
//!
//! The store is the source of truth; the scheduler never caches its own
//! authoritative copy.

mod json_file;
mod memory;

use async_trait::async_trait;
use nudge_core::Reminder;
use thiserror::Error;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Errors from a reminder store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Keyed get/set access to persisted reminders.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// All reminders, in store order.
    async fn list(&self) -> Result<Vec<Reminder>, StoreError>;

    /// Insert or replace by id. An empty id is replaced with a fresh one;
    /// the stored reminder is returned.
    async fn upsert(&self, reminder: Reminder) -> Result<Reminder, StoreError>;

    /// Remove by id. Returns whether anything was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Reminder>, StoreError> {
        Ok(self.list().await?.into_iter().find(|r| r.id == id))
    }
}
