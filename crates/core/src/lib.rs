pub mod clock;
pub mod config;
pub mod due;
pub mod error;
pub mod recurrence;
pub mod reminder;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{NotifyConfig, NudgeConfig, SchedulerConfig, StoreConfig};
pub use due::is_due;
pub use error::*;
pub use recurrence::{next_date, Recurrence};
pub use reminder::*;
