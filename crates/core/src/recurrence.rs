//! Recurrence rules and next-occurrence date arithmetic.
//!
//! The engine works on calendar dates only. Month and year steps use
//! calendar arithmetic and clamp to the last day of the target month when
//! the original day-of-month does not exist there:
//!
//! - `monthly` from Jan 31 gives Feb 29 in a leap year, Feb 28 otherwise.
//! - `yearly` from Feb 29 gives Feb 28 of the following year.
//!
//! Occurrences are independent entities, so the clamp is not undone later:
//! Jan 31 -> Feb 29 -> Mar 29.

use std::fmt;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// How a reminder repeats once completed.
///
/// Unknown rule strings are kept verbatim in [`Recurrence::Unrecognized`] so
/// they survive a store round-trip, but the engine treats them as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Unrecognized(String),
}

impl Recurrence {
    pub fn as_str(&self) -> &str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Yearly => "yearly",
            Recurrence::Unrecognized(raw) => raw.as_str(),
        }
    }

    /// Whether completing a reminder with this rule materializes a successor.
    pub fn is_recurring(&self) -> bool {
        matches!(
            self,
            Recurrence::Daily | Recurrence::Weekly | Recurrence::Monthly | Recurrence::Yearly
        )
    }
}

impl From<&str> for Recurrence {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Recurrence::None,
            "daily" => Recurrence::Daily,
            "weekly" => Recurrence::Weekly,
            "monthly" => Recurrence::Monthly,
            "yearly" => Recurrence::Yearly,
            _ => Recurrence::Unrecognized(raw.to_string()),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Recurrence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Recurrence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Recurrence::from).unwrap_or_default())
    }
}

/// Compute the date of the next occurrence after `current` under `rule`.
///
/// Non-recurring and unrecognized rules return `current` unchanged. A step
/// past the end of the representable calendar also returns `current`.
pub fn next_date(current: NaiveDate, rule: &Recurrence) -> NaiveDate {
    let next = match rule {
        Recurrence::Daily => current.checked_add_days(Days::new(1)),
        Recurrence::Weekly => current.checked_add_days(Days::new(7)),
        Recurrence::Monthly => current.checked_add_months(Months::new(1)),
        Recurrence::Yearly => current.checked_add_months(Months::new(12)),
        Recurrence::None | Recurrence::Unrecognized(_) => return current,
    };

    next.unwrap_or_else(|| {
        warn!(date = %current, rule = %rule, "next occurrence out of calendar range");
        current
    })
}
