//! Builds the channel and renderer described by a [`NotifyConfig`].

use std::sync::Arc;

use nudge_core::NotifyConfig;

use crate::channel::NotificationChannel;
use crate::console::ConsolePlatform;
use crate::templating::NotificationRenderer;
use crate::traits::NotifyError;
use crate::webhook::WebhookPlatform;

/// Construct the notification channel selected by `config.channel`.
///
/// `"none"` yields a channel with no platform: reminders still surface in
/// the in-app list, nothing leaves the process.
pub fn build_channel(config: &NotifyConfig) -> Result<NotificationChannel, NotifyError> {
    match config.channel.as_str() {
        "console" => Ok(NotificationChannel::new(Arc::new(ConsolePlatform::new()))),
        "webhook" => {
            let url = config.webhook_url.clone().ok_or_else(|| {
                NotifyError::Config("webhook channel requires webhook_url".into())
            })?;
            let platform = WebhookPlatform::from_config(
                url,
                config.webhook_method.clone(),
                config.webhook_headers.clone(),
                config.webhook_timeout(),
            )?;
            Ok(NotificationChannel::new(Arc::new(platform)))
        }
        "none" => Ok(NotificationChannel::unavailable()),
        other => Err(NotifyError::Config(format!("unknown channel: {other}"))),
    }
}

/// Construct the renderer from the configured templates.
pub fn build_renderer(config: &NotifyConfig) -> Result<NotificationRenderer, NotifyError> {
    NotificationRenderer::new(config.title_template.clone(), config.body_template.clone())
}
