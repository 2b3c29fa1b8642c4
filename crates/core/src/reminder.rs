use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ReminderError;
use crate::recurrence::{next_date, Recurrence};

/// Generate a fresh reminder identifier.
pub fn new_reminder_id() -> String {
    Uuid::new_v4().to_string()
}

/// A persisted reminder. Each occurrence of a recurring reminder is its own
/// `Reminder` with its own id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Empty until the store assigns one.
    #[serde(default)]
    pub id: String,
    pub text: String,
    /// Calendar date, no time zone.
    pub date: NaiveDate,
    /// Clock time; `None` means due at the start of `date`.
    #[serde(default, with = "clock_time")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Reminder {
    pub fn new(text: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            date,
            time: None,
            recurrence: Recurrence::None,
            completed: false,
            completed_at: None,
            notes: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// The instant this reminder becomes due.
    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(NaiveTime::MIN))
    }

    /// Check the fields the scheduler relies on.
    pub fn validate(&self) -> Result<(), ReminderError> {
        if self.id.trim().is_empty() {
            return Err(ReminderError::MissingId);
        }
        if self.text.trim().is_empty() {
            return Err(ReminderError::EmptyText(self.id.clone()));
        }
        match (self.completed, self.completed_at.is_some()) {
            (true, false) => Err(ReminderError::MissingCompletedAt(self.id.clone())),
            (false, true) => Err(ReminderError::StaleCompletedAt(self.id.clone())),
            _ => Ok(()),
        }
    }

    /// Transition to completed. Returns `false` if it already was.
    pub fn mark_completed(&mut self, at: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(at);
        true
    }

    /// Transition back to not completed. Returns `false` if it already was.
    pub fn mark_incomplete(&mut self) -> bool {
        if !self.completed {
            return false;
        }
        self.completed = false;
        self.completed_at = None;
        true
    }

    /// Build the successor occurrence of a recurring reminder.
    ///
    /// Returns `None` for one-off reminders and unrecognized rules. The
    /// successor carries a fresh id and starts incomplete; `self` is untouched.
    pub fn next_occurrence(&self) -> Option<Reminder> {
        if !self.recurrence.is_recurring() {
            return None;
        }
        Some(Reminder {
            id: new_reminder_id(),
            text: self.text.clone(),
            date: next_date(self.date, &self.recurrence),
            time: self.time,
            recurrence: self.recurrence.clone(),
            completed: false,
            completed_at: None,
            notes: self.notes.clone(),
        })
    }
}

/// `HH:MM` (or `HH:MM:SS`) wire format for optional clock times.
mod clock_time {
    use chrono::{NaiveTime, Timelike};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) if t.second() == 0 && t.nanosecond() == 0 => {
                s.serialize_str(&t.format("%H:%M").to_string())
            }
            Some(t) => s.serialize_str(&t.format("%H:%M:%S").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveTime::parse_from_str(s, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid time {s:?}: {e}"))),
        }
    }
}
