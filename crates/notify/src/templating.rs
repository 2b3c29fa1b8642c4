//! Minijinja rendering of notification text from a reminder.
//!
//! Templates are arbitrary strings from config, so a fresh
//! [`minijinja::Environment`] is created per render call.

use nudge_core::Reminder;
use tracing::warn;

use crate::traits::{Notification, NotifyError};

const FALLBACK_TITLE: &str = "Reminder";

/// Reminder fields exposed to templates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReminderContext {
    pub id: String,
    pub text: String,
    pub notes: Option<String>,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`, absent for all-day reminders.
    pub time: Option<String>,
    pub recurrence: String,
}

impl From<&Reminder> for ReminderContext {
    fn from(reminder: &Reminder) -> Self {
        Self {
            id: reminder.id.clone(),
            text: reminder.text.clone(),
            notes: reminder.notes.clone(),
            date: reminder.date.format("%Y-%m-%d").to_string(),
            time: reminder.time.map(|t| t.format("%H:%M").to_string()),
            recurrence: reminder.recurrence.to_string(),
        }
    }
}

/// Renders notification title and body for a reminder.
#[derive(Debug, Clone)]
pub struct NotificationRenderer {
    title_template: String,
    body_template: String,
}

impl NotificationRenderer {
    /// Create a renderer, checking both templates parse.
    pub fn new(
        title_template: impl Into<String>,
        body_template: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let renderer = Self {
            title_template: title_template.into(),
            body_template: body_template.into(),
        };
        Self::validate(&renderer.title_template)
            .map_err(|e| NotifyError::Config(format!("invalid title template: {e}")))?;
        Self::validate(&renderer.body_template)
            .map_err(|e| NotifyError::Config(format!("invalid body template: {e}")))?;
        Ok(renderer)
    }

    /// Validate that a template string parses without evaluating it.
    pub fn validate(template_str: &str) -> Result<(), NotifyError> {
        let env = minijinja::Environment::new();
        env.template_from_str(template_str)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        Ok(())
    }

    fn render_str(template_str: &str, ctx: &ReminderContext) -> Result<String, NotifyError> {
        let env = minijinja::Environment::new();
        env.render_str(template_str, ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    /// Render the notification for `reminder`, tagged with its id.
    ///
    /// A render failure falls back to the reminder text so the user is
    /// still told something.
    pub fn render(&self, reminder: &Reminder) -> Notification {
        let ctx = ReminderContext::from(reminder);
        let rendered = Self::render_str(&self.title_template, &ctx)
            .and_then(|title| {
                Self::render_str(&self.body_template, &ctx).map(|body| (title, body))
            });

        let (title, body) = match rendered {
            Ok(pair) => pair,
            Err(e) => {
                warn!(reminder_id = %reminder.id, error = %e, "template rendering failed, using plain text");
                (FALLBACK_TITLE.to_string(), reminder.text.clone())
            }
        };

        Notification::new(title, body).with_tag(reminder.id.clone())
    }
}

impl Default for NotificationRenderer {
    fn default() -> Self {
        Self {
            title_template: FALLBACK_TITLE.to_string(),
            body_template: "{{ text }}{% if notes %}\n{{ notes }}{% endif %}".to_string(),
        }
    }
}
