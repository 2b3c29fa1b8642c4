//! Reminder scheduler runner -- owns the tick loop and its state.
//!
//! Split into focused submodules:
//! - `core`: scheduler struct, builder, start/stop state machine, accessors
//! - `tick`: one evaluation pass over the reminder list
//! - `lifecycle`: hooks the CRUD layer calls on create/edit/complete/dismiss

mod core;
mod lifecycle;
mod tick;

pub use self::core::{ReminderScheduler, SchedulerBuilder};
pub use self::tick::TickReport;
