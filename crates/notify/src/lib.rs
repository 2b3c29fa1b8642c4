//! External notification channel for due reminders.
//!
//! This crate provides:
//! - `NotificationPlatform` trait for pluggable OS/host notification backends
//! - `NotificationChannel`, the permission-gated wrapper the scheduler talks to
//! - Console and webhook platform implementations
//! - Minijinja rendering of notification title/body from a reminder
//! - `build_channel` to assemble all of the above from config

pub mod channel;
pub mod console;
pub mod factory;
pub mod templating;
pub mod traits;
pub mod webhook;

pub use channel::NotificationChannel;
pub use factory::{build_channel, build_renderer};
pub use templating::NotificationRenderer;
pub use traits::{DeliveryOutcome, Notification, NotificationPlatform, NotifyError, Permission};
