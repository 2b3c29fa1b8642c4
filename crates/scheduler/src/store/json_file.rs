use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nudge_core::{new_reminder_id, Reminder};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{ReminderStore, StoreError};

/// Reminders kept as a JSON array in a single file.
///
/// Records that fail to decode are skipped by [`list`](ReminderStore::list)
/// with a warning, but are preserved on disk when other records are
/// written. A missing file reads as an empty list.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles from this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_raw(&self) -> Result<Vec<Value>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file missing, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a uniquely named temporary file in the target directory,
    /// then rename it over the target. Concurrent writers never share a
    /// temporary file; the last rename wins.
    async fn save_raw(&self, records: &[Value]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&dir)?;

            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

#[async_trait]
impl ReminderStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<Reminder>, StoreError> {
        let records = self.load_raw().await?;
        let mut reminders = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let id = record_id(&record).unwrap_or("").to_string();
            match serde_json::from_value::<Reminder>(record) {
                Ok(reminder) => reminders.push(reminder),
                Err(e) => warn!(
                    path = %self.path.display(),
                    index,
                    reminder_id = %id,
                    error = %e,
                    "skipping malformed reminder record"
                ),
            }
        }
        Ok(reminders)
    }

    async fn upsert(&self, mut reminder: Reminder) -> Result<Reminder, StoreError> {
        if reminder.id.is_empty() {
            reminder.id = new_reminder_id();
        }
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_raw().await?;
        let value = serde_json::to_value(&reminder)?;

        match records
            .iter_mut()
            .find(|r| record_id(r) == Some(reminder.id.as_str()))
        {
            Some(existing) => *existing = value,
            None => records.push(value),
        }

        self.save_raw(&records).await?;
        Ok(reminder)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_raw().await?;
        let before = records.len();
        records.retain(|r| record_id(r) != Some(id));
        if records.len() == before {
            return Ok(false);
        }
        self.save_raw(&records).await?;
        Ok(true)
    }
}
