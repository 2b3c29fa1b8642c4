//! Due-reminder scheduling engine.
//!
//! Periodically reads the reminder list from a [`ReminderStore`], delivers
//! one notification per due episode through a
//! [`NotificationChannel`](nudge_notify::NotificationChannel), and keeps an
//! in-app list of surfaced reminders in a [`NotificationHub`] that UI code
//! subscribes to. Lifecycle hooks on [`ReminderScheduler`] keep that state
//! consistent when reminders are created, edited, completed or dismissed.

pub mod error;
pub mod hub;
pub mod runner;
pub mod store;
pub mod tracker;

pub use error::SchedulerError;
pub use hub::{NotificationHub, Subscription};
pub use runner::{ReminderScheduler, SchedulerBuilder, TickReport};
pub use store::{JsonFileStore, MemoryStore, ReminderStore, StoreError};
pub use tracker::DeliveryTracker;
