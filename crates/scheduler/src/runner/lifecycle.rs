//! Hooks the CRUD layer calls when reminders change, plus convenience
//! operations that persist a change and run the matching hook.

use nudge_core::{new_reminder_id, CoreError, Reminder};
use tracing::{debug, info};

use super::core::ReminderScheduler;
use crate::error::SchedulerError;

impl ReminderScheduler {
    /// A reminder was created. Clears any delivery record under its id.
    pub fn on_created(&self, reminder: &Reminder) {
        if self.shared.tracker().reset(&reminder.id) {
            debug!(reminder_id = %reminder.id, "cleared stale delivery record on create");
        }
    }

    /// A reminder was edited. Starts a new episode: the next due tick
    /// notifies again and re-surfaces it with the edited fields.
    pub fn on_updated(&self, reminder: &Reminder) {
        self.shared.tracker().reset(&reminder.id);
        self.shared.hub.publish_remove(&reminder.id);
        debug!(reminder_id = %reminder.id, "reminder edited, delivery state reset");
    }

    /// A reminder was marked complete.
    ///
    /// Drops it from the active set and, for a recurring reminder, stores
    /// the next occurrence as a new reminder and returns it. Call once per
    /// completion; each call stores another successor.
    pub async fn on_completed(
        &self,
        reminder: &Reminder,
    ) -> Result<Option<Reminder>, SchedulerError> {
        self.shared.tracker().reset(&reminder.id);
        self.shared.hub.publish_remove(&reminder.id);

        let Some(successor) = reminder.next_occurrence() else {
            debug!(
                reminder_id = %reminder.id,
                recurrence = %reminder.recurrence,
                "completed reminder does not recur"
            );
            return Ok(None);
        };

        let stored = self.shared.store.upsert(successor).await?;
        self.shared.tracker().reset(&stored.id);
        info!(
            reminder_id = %reminder.id,
            successor_id = %stored.id,
            date = %stored.date,
            recurrence = %stored.recurrence,
            "scheduled next occurrence"
        );
        Ok(Some(stored))
    }

    /// The user dismissed the in-app banner. The reminder stays notified:
    /// it will not notify or surface again until edited or completed.
    pub fn on_dismissed(&self, id: &str) -> bool {
        self.shared.hub.publish_remove(id)
    }

    // ── Convenience operations ──────────────────────────────────────

    /// Validate and store a new reminder, then run
    /// [`on_created`](Self::on_created). An empty id is assigned here.
    pub async fn create_reminder(&self, mut reminder: Reminder) -> Result<Reminder, SchedulerError> {
        if reminder.id.is_empty() {
            reminder.id = new_reminder_id();
        }
        reminder.validate().map_err(CoreError::from)?;
        let stored = self.shared.store.upsert(reminder).await?;
        self.on_created(&stored);
        Ok(stored)
    }

    /// Validate and store an edited reminder, then run
    /// [`on_updated`](Self::on_updated).
    pub async fn update_reminder(&self, reminder: Reminder) -> Result<Reminder, SchedulerError> {
        reminder.validate().map_err(CoreError::from)?;
        let stored = self.shared.store.upsert(reminder).await?;
        self.on_updated(&stored);
        Ok(stored)
    }

    /// Mark the stored reminder `id` complete and run
    /// [`on_completed`](Self::on_completed).
    ///
    /// Completing an already-completed reminder changes nothing and returns
    /// `Ok(None)`, so a double click cannot create two successors.
    pub async fn complete_reminder(&self, id: &str) -> Result<Option<Reminder>, SchedulerError> {
        let mut reminder = self
            .shared
            .store
            .get(id)
            .await?
            .ok_or_else(|| SchedulerError::ReminderNotFound(id.to_string()))?;

        if !reminder.mark_completed(self.shared.clock.timestamp()) {
            debug!(reminder_id = %id, "reminder already completed");
            return Ok(None);
        }
        let reminder = self.shared.store.upsert(reminder).await?;
        self.on_completed(&reminder).await
    }

    /// Delete the stored reminder `id` and drop its in-process state now
    /// rather than at the next tick.
    pub async fn delete_reminder(&self, id: &str) -> Result<bool, SchedulerError> {
        let removed = self.shared.store.delete(id).await?;
        self.shared.tracker().reset(id);
        self.shared.hub.publish_remove(id);
        Ok(removed)
    }
}
