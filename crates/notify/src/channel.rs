//! Permission-gated notification channel.
//!
//! Wraps an optional [`NotificationPlatform`] and turns every way delivery
//! can fail (no platform, no permission, platform error) into a
//! [`DeliveryOutcome`]. Nothing here returns an error to the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::traits::{DeliveryOutcome, Notification, NotificationPlatform, Permission};

/// The scheduler's view of the external notification channel.
pub struct NotificationChannel {
    platform: Option<Arc<dyn NotificationPlatform>>,
    /// Set once the automatic path has prompted; later automatic calls
    /// never prompt again.
    auto_prompted: AtomicBool,
}

impl NotificationChannel {
    pub fn new(platform: Arc<dyn NotificationPlatform>) -> Self {
        Self {
            platform: Some(platform),
            auto_prompted: AtomicBool::new(false),
        }
    }

    /// A channel with no platform behind it. Every delivery is
    /// [`DeliveryOutcome::Unsupported`].
    pub fn unavailable() -> Self {
        Self {
            platform: None,
            auto_prompted: AtomicBool::new(false),
        }
    }

    pub fn platform_name(&self) -> &str {
        self.platform
            .as_deref()
            .map(|p| p.platform_name())
            .unwrap_or("none")
    }

    /// Whether a platform exists and reports support on this host.
    pub fn is_available(&self) -> bool {
        self.supported_platform().is_some()
    }

    fn supported_platform(&self) -> Option<&dyn NotificationPlatform> {
        self.platform.as_deref().filter(|p| p.is_supported())
    }

    /// Make sure permission is granted, prompting at most once per process.
    ///
    /// Safe to call repeatedly. After a denial (or an unanswered prompt) this
    /// returns `false` without prompting; only
    /// [`request_permission_explicit`](Self::request_permission_explicit)
    /// asks again.
    pub async fn request_permission(&self) -> bool {
        let Some(platform) = self.supported_platform() else {
            debug!("no notification platform available");
            return false;
        };

        match platform.permission().await {
            Permission::Granted => true,
            Permission::Denied => {
                debug!(platform = platform.platform_name(), "notification permission denied");
                false
            }
            Permission::Undetermined => {
                if self.auto_prompted.swap(true, Ordering::SeqCst) {
                    debug!(
                        platform = platform.platform_name(),
                        "permission still undetermined, not prompting again"
                    );
                    return false;
                }
                let answer = platform.request_permission().await;
                info!(
                    platform = platform.platform_name(),
                    permission = ?answer,
                    "notification permission requested"
                );
                answer == Permission::Granted
            }
        }
    }

    /// Prompt for permission because the user asked to, regardless of any
    /// earlier answer.
    pub async fn request_permission_explicit(&self) -> bool {
        let Some(platform) = self.supported_platform() else {
            debug!("no notification platform available");
            return false;
        };
        self.auto_prompted.store(true, Ordering::SeqCst);
        let answer = platform.request_permission().await;
        info!(
            platform = platform.platform_name(),
            permission = ?answer,
            "notification permission requested by user"
        );
        answer == Permission::Granted
    }

    /// Deliver a plain title/body notification.
    pub async fn deliver(&self, title: &str, body: &str) -> DeliveryOutcome {
        self.deliver_notification(&Notification::new(title, body))
            .await
    }

    /// Deliver a notification, degrading to an outcome on any failure.
    ///
    /// Permission is re-queried on every call so a grant or revocation made
    /// mid-session takes effect on the next delivery.
    pub async fn deliver_notification(&self, notification: &Notification) -> DeliveryOutcome {
        let Some(platform) = self.supported_platform() else {
            return DeliveryOutcome::Unsupported;
        };

        if !self.request_permission().await {
            return DeliveryOutcome::Declined;
        }

        match platform.show(notification).await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => {
                warn!(
                    platform = platform.platform_name(),
                    tag = notification.tag.as_deref().unwrap_or(""),
                    error = %e,
                    "notification delivery failed"
                );
                DeliveryOutcome::Declined
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::NotifyError;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct FakePlatform {
        supported: bool,
        permission: Mutex<Permission>,
        prompt_answer: Permission,
        should_fail: bool,
        prompts: AtomicUsize,
        shown: AtomicUsize,
    }

    impl FakePlatform {
        fn new(permission: Permission, prompt_answer: Permission) -> Self {
            Self {
                supported: true,
                permission: Mutex::new(permission),
                prompt_answer,
                should_fail: false,
                prompts: AtomicUsize::new(0),
                shown: AtomicUsize::new(0),
            }
        }

        fn set_permission(&self, permission: Permission) {
            *self.permission.lock().unwrap() = permission;
        }
    }

    #[async_trait::async_trait]
    impl NotificationPlatform for FakePlatform {
        fn is_supported(&self) -> bool {
            self.supported
        }
        async fn permission(&self) -> Permission {
            *self.permission.lock().unwrap()
        }
        async fn request_permission(&self) -> Permission {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            *self.permission.lock().unwrap() = self.prompt_answer;
            self.prompt_answer
        }
        async fn show(&self, _notification: &Notification) -> Result<(), NotifyError> {
            self.shown.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                Err(NotifyError::Platform("mock failure".to_string()))
            } else {
                Ok(())
            }
        }
        fn platform_name(&self) -> &str {
            "fake"
        }
    }

    #[tokio::test]
    async fn granted_permission_delivers() {
        let platform = Arc::new(FakePlatform::new(Permission::Granted, Permission::Granted));
        let channel = NotificationChannel::new(platform.clone());

        assert_eq!(channel.deliver("t", "b").await, DeliveryOutcome::Delivered);
        assert_eq!(platform.shown.load(Ordering::SeqCst), 1);
        assert_eq!(platform.prompts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn undetermined_prompts_once_then_delivers() {
        let platform = Arc::new(FakePlatform::new(
            Permission::Undetermined,
            Permission::Granted,
        ));
        let channel = NotificationChannel::new(platform.clone());

        assert!(channel.request_permission().await);
        assert!(channel.request_permission().await);
        assert_eq!(channel.deliver("t", "b").await, DeliveryOutcome::Delivered);
        assert_eq!(platform.prompts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn denied_never_reprompts_automatically() {
        let platform = Arc::new(FakePlatform::new(
            Permission::Undetermined,
            Permission::Denied,
        ));
        let channel = NotificationChannel::new(platform.clone());

        assert!(!channel.request_permission().await);
        assert!(!channel.request_permission().await);
        assert_eq!(channel.deliver("t", "b").await, DeliveryOutcome::Declined);
        assert_eq!(platform.prompts.load(Ordering::SeqCst), 1);
        assert_eq!(platform.shown.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dismissed_prompt_is_not_repeated() {
        let platform = Arc::new(FakePlatform::new(
            Permission::Undetermined,
            Permission::Undetermined,
        ));
        let channel = NotificationChannel::new(platform.clone());

        assert!(!channel.request_permission().await);
        assert_eq!(channel.deliver("t", "b").await, DeliveryOutcome::Declined);
        assert_eq!(platform.prompts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn explicit_request_prompts_after_denial() {
        let platform = Arc::new(FakePlatform::new(Permission::Denied, Permission::Granted));
        let channel = NotificationChannel::new(platform.clone());

        assert_eq!(channel.deliver("t", "b").await, DeliveryOutcome::Declined);
        assert!(channel.request_permission_explicit().await);
        assert_eq!(platform.prompts.load(Ordering::SeqCst), 1);
        assert_eq!(channel.deliver("t", "b").await, DeliveryOutcome::Delivered);
    }

    #[tokio::test]
    async fn revoked_mid_session_declines_next_delivery() {
        let platform = Arc::new(FakePlatform::new(Permission::Granted, Permission::Granted));
        let channel = NotificationChannel::new(platform.clone());

        assert_eq!(channel.deliver("t", "b").await, DeliveryOutcome::Delivered);
        platform.set_permission(Permission::Denied);
        assert_eq!(channel.deliver("t", "b").await, DeliveryOutcome::Declined);
        platform.set_permission(Permission::Granted);
        assert_eq!(channel.deliver("t", "b").await, DeliveryOutcome::Delivered);
    }

    #[tokio::test]
    async fn platform_error_becomes_declined() {
        let mut fake = FakePlatform::new(Permission::Granted, Permission::Granted);
        fake.should_fail = true;
        let platform = Arc::new(fake);
        let channel = NotificationChannel::new(platform.clone());

        assert_eq!(channel.deliver("t", "b").await, DeliveryOutcome::Declined);
        assert_eq!(platform.shown.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsupported_platform_and_missing_platform() {
        let mut fake = FakePlatform::new(Permission::Granted, Permission::Granted);
        fake.supported = false;
        let channel = NotificationChannel::new(Arc::new(fake));
        assert!(!channel.is_available());
        assert!(!channel.request_permission().await);
        assert_eq!(channel.deliver("t", "b").await, DeliveryOutcome::Unsupported);

        let channel = NotificationChannel::unavailable();
        assert_eq!(channel.platform_name(), "none");
        assert!(!channel.request_permission_explicit().await);
        assert_eq!(channel.deliver("t", "b").await, DeliveryOutcome::Unsupported);
    }
}
