//! Console platform: notifications go to the log.
//!
//! Used by the worker on headless hosts, where there is no desktop
//! notification service but the log is watched.

use tracing::info;

use crate::traits::{Notification, NotificationPlatform, NotifyError, Permission};

/// Always supported, always permitted; each notification is one log event.
#[derive(Debug, Default)]
pub struct ConsolePlatform;

impl ConsolePlatform {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl NotificationPlatform for ConsolePlatform {
    async fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            target: "nudge::notification",
            title = %notification.title,
            body = %notification.body,
            reminder_id = notification.tag.as_deref().unwrap_or(""),
            "reminder due"
        );
        Ok(())
    }

    fn platform_name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn console_is_granted_and_shows() {
        let platform = ConsolePlatform::new();
        assert!(platform.is_supported());
        assert_eq!(platform.permission().await, Permission::Granted);
        assert!(platform.show(&Notification::new("t", "b")).await.is_ok());
        assert_eq!(platform.platform_name(), "console");
    }
}
