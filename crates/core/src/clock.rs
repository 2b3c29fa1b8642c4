//! Wall-clock source for the scheduler, swappable in tests.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};

/// Source of the current time.
///
/// `now` is local wall-clock time without a zone, which is what reminder
/// dates and times are compared against.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// Absolute timestamp used for `completedAt`.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// The host's local clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The manual wall clock read as UTC.
    fn timestamp(&self) -> DateTime<Utc> {
        self.now().and_utc()
    }
}
