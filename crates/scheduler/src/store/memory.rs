use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use indexmap::IndexMap;
use nudge_core::{new_reminder_id, Reminder};

use super::{ReminderStore, StoreError};

/// In-process store keeping insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    reminders: RwLock<IndexMap<String, Reminder>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing records. Records with an empty id get one.
    pub fn with_reminders(reminders: impl IntoIterator<Item = Reminder>) -> Self {
        let map = reminders
            .into_iter()
            .map(|mut r| {
                if r.id.is_empty() {
                    r.id = new_reminder_id();
                }
                (r.id.clone(), r)
            })
            .collect();
        Self {
            reminders: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.reminders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReminderStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Reminder>, StoreError> {
        let reminders = self.reminders.read().unwrap_or_else(PoisonError::into_inner);
        Ok(reminders.values().cloned().collect())
    }

    async fn upsert(&self, mut reminder: Reminder) -> Result<Reminder, StoreError> {
        if reminder.id.is_empty() {
            reminder.id = new_reminder_id();
        }
        let mut reminders = self.reminders.write().unwrap_or_else(PoisonError::into_inner);
        reminders.insert(reminder.id.clone(), reminder.clone());
        Ok(reminder)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut reminders = self.reminders.write().unwrap_or_else(PoisonError::into_inner);
        Ok(reminders.shift_remove(id).is_some())
    }

    async fn get(&self, id: &str) -> Result<Option<Reminder>, StoreError> {
        let reminders = self.reminders.read().unwrap_or_else(PoisonError::into_inner);
        Ok(reminders.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reminder(text: &str) -> Reminder {
        Reminder::new(text, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[tokio::test]
    async fn upsert_assigns_missing_id() {
        let store = MemoryStore::new();
        let stored = store.upsert(reminder("a")).await.unwrap();
        assert!(!stored.id.is_empty());
        assert_eq!(store.get(&stored.id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn upsert_replaces_in_place() {
        let store = MemoryStore::with_reminders([
            reminder("a").with_id("1"),
            reminder("b").with_id("2"),
        ]);
        store.upsert(reminder("a2").with_id("1")).await.unwrap();
        let texts: Vec<_> = store.list().await.unwrap().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["a2", "b"]);
    }

    #[tokio::test]
    async fn delete_keeps_order_of_the_rest() {
        let store = MemoryStore::with_reminders([
            reminder("a").with_id("1"),
            reminder("b").with_id("2"),
            reminder("c").with_id("3"),
        ]);
        assert!(store.delete("2").await.unwrap());
        assert!(!store.delete("2").await.unwrap());
        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(store.len(), 2);
    }
}
