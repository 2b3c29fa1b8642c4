//! Due-check predicate evaluated on every scheduler tick.

use chrono::NaiveDateTime;

use crate::reminder::Reminder;

/// Whether `reminder` counts as due at the wall-clock instant `now`.
///
/// Stateless: whether a due reminder has already been notified is tracked
/// elsewhere.
pub fn is_due(reminder: &Reminder, now: NaiveDateTime) -> bool {
    !reminder.completed && reminder.scheduled_at() <= now
}
