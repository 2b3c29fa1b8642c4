//! Platform trait definition and shared notification types.

/// Errors that can occur while setting up or talking to a platform.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Platform error: {0}")]
    Platform(String),
}

/// A rendered notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Identifies the reminder this notification is about, so a click can
    /// be routed back to it.
    pub tag: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Notification permission as reported by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    /// The user has not been asked yet (or dismissed the prompt).
    Undetermined,
}

/// Result of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Delivered,
    /// Permission missing or the platform refused; in-app only.
    Declined,
    /// No notification platform on this host; in-app only.
    Unsupported,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOutcome::Delivered => "delivered",
            DeliveryOutcome::Declined => "declined",
            DeliveryOutcome::Unsupported => "unsupported",
        }
    }
}

/// Trait for host notification backends.
#[async_trait::async_trait]
pub trait NotificationPlatform: Send + Sync {
    /// Whether this host can show notifications at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Query the current permission without prompting.
    async fn permission(&self) -> Permission;

    /// Prompt the user for permission and return the answer.
    async fn request_permission(&self) -> Permission;

    /// Show a single notification.
    async fn show(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Human-readable name for this platform (e.g., "console", "webhook").
    fn platform_name(&self) -> &str;
}
