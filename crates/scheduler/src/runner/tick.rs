use std::collections::{HashMap, HashSet};

use nudge_core::is_due;
use nudge_notify::DeliveryOutcome;
use tracing::{debug, info, warn};

use super::core::{ReminderScheduler, Shared};

/// What one tick did. Returned by [`ReminderScheduler::tick`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Incomplete, well-formed reminders looked at.
    pub evaluated: usize,
    /// Of those, how many were due.
    pub due: usize,
    /// Delivery attempts made (due and not yet notified).
    pub attempted: usize,
    pub delivered: usize,
    pub declined: usize,
    pub unsupported: usize,
    /// Attempts left unrecorded because a lifecycle hook reset the reminder
    /// after this tick read it.
    pub superseded: usize,
    /// Records skipped because they failed validation.
    pub skipped_malformed: usize,
    /// Delivery records dropped for reminders no longer listed.
    pub pruned_tracked: usize,
    /// Active-set entries dropped for reminders no longer listed.
    pub pruned_active: usize,
    /// The store could not be read; nothing else was done.
    pub store_failed: bool,
}

impl TickReport {
    fn record(&mut self, outcome: DeliveryOutcome) {
        self.attempted += 1;
        match outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::Declined => self.declined += 1,
            DeliveryOutcome::Unsupported => self.unsupported += 1,
        }
    }
}

impl Shared {
    /// One evaluation pass over the store's current reminder list.
    pub(super) async fn tick(&self) -> TickReport {
        let _serial = self.tick_guard.lock().await;
        let now = self.clock.now();
        let mut report = TickReport::default();

        let reminders = match self.store.list().await {
            Ok(reminders) => reminders,
            Err(e) => {
                warn!(error = %e, "failed to list reminders, skipping tick");
                report.store_failed = true;
                return report;
            }
        };

        // Episodes as of this read; a later reset makes the snapshot stale.
        let episodes: HashMap<String, u64> = {
            let tracker = self.tracker();
            reminders
                .iter()
                .map(|r| (r.id.clone(), tracker.episode(&r.id)))
                .collect()
        };
        let mut present: HashSet<String> = HashSet::with_capacity(reminders.len());

        for reminder in reminders {
            if reminder.completed {
                continue;
            }
            if let Err(e) = reminder.validate() {
                warn!(reminder_id = %reminder.id, error = %e, "skipping malformed reminder");
                report.skipped_malformed += 1;
                continue;
            }
            present.insert(reminder.id.clone());
            report.evaluated += 1;

            if !is_due(&reminder, now) {
                continue;
            }
            report.due += 1;

            let eligible = self.tracker().should_attempt_notify(&reminder.id);
            if !eligible {
                continue;
            }
            let episode = episodes.get(&reminder.id).copied().unwrap_or_default();

            let notification = self.renderer.render(&reminder);
            let outcome = self.channel.deliver_notification(&notification).await;
            report.record(outcome);
            if outcome.is_delivered() {
                info!(reminder_id = %reminder.id, "reminder notification delivered");
            } else {
                info!(
                    reminder_id = %reminder.id,
                    outcome = outcome.as_str(),
                    "notification not delivered, falling back to in-app only"
                );
            }

            // A hook reset this reminder after the list was read; the
            // snapshot is stale and the next tick starts over.
            if !self.tracker().mark_notified_in(&reminder.id, episode) {
                debug!(reminder_id = %reminder.id, "reminder changed during delivery, not surfacing");
                report.superseded += 1;
                continue;
            }
            self.hub.publish_add(reminder);
        }

        report.pruned_tracked = self.tracker().prune_missing(&present);
        report.pruned_active = self.hub.retain_ids(&present);

        debug!(
            evaluated = report.evaluated,
            due = report.due,
            attempted = report.attempted,
            skipped = report.skipped_malformed,
            superseded = report.superseded,
            pruned = report.pruned_tracked + report.pruned_active,
            "tick complete"
        );
        report
    }
}

impl ReminderScheduler {
    /// Run one evaluation pass now, independent of the timer.
    ///
    /// Passes never overlap: a call made while the timer's pass is in
    /// progress waits for it to finish.
    pub async fn tick(&self) -> TickReport {
        self.shared.tick().await
    }
}
