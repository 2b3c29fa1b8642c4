//! HTTP webhook platform.
//!
//! Posts each reminder notification as a JSON payload to a configured URL,
//! for hosts that forward alerts to a phone or chat bridge.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use crate::traits::{Notification, NotificationPlatform, NotifyError, Permission};

/// JSON body sent for every notification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload<'a> {
    kind: &'static str,
    title: &'a str,
    body: &'a str,
    /// The reminder this notification is about, when known.
    reminder_id: Option<&'a str>,
}

impl<'a> From<&'a Notification> for WebhookPayload<'a> {
    fn from(n: &'a Notification) -> Self {
        Self {
            kind: "reminder",
            title: &n.title,
            body: &n.body,
            reminder_id: n.tag.as_deref(),
        }
    }
}

/// Delivers notifications as JSON over HTTP.
///
/// `${VAR_NAME}` references in the URL and header values are expanded once,
/// at construction. Configuring a webhook is the grant: it never prompts.
#[derive(Debug)]
pub struct WebhookPlatform {
    url: String,
    method: Method,
    headers: HeaderMap,
    client: reqwest::Client,
}

impl WebhookPlatform {
    /// Build from config values. `method` is case-insensitive and defaults
    /// to `POST`. A request that has not completed within `timeout` fails.
    pub fn from_config(
        url: String,
        method: Option<String>,
        headers: HashMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let method = match method.as_deref() {
            None => Method::POST,
            Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .map_err(|_| NotifyError::Config(format!("invalid HTTP method: {m}")))?,
        };

        let url = expand_env(&url)?;
        if url.trim().is_empty() {
            return Err(NotifyError::Config("webhook URL is empty".into()));
        }

        let mut header_map = HeaderMap::with_capacity(headers.len());
        for (name, value) in &headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| NotifyError::Config(format!("invalid header name: {name}")))?;
            let value = HeaderValue::from_str(&expand_env(value)?)
                .map_err(|_| NotifyError::Config(format!("invalid value for header {name}")))?;
            header_map.insert(name, value);
        }

        Ok(Self {
            url,
            method,
            headers: header_map,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait::async_trait]
impl NotificationPlatform for WebhookPlatform {
    async fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .request(self.method.clone(), &self.url)
            .headers(self.headers.clone())
            .json(&WebhookPayload::from(notification))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NotifyError::Platform(format!(
                "webhook responded {status}: {detail}"
            )));
        }

        debug!(
            url = %self.url,
            status = %status,
            reminder_id = notification.tag.as_deref().unwrap_or(""),
            "webhook accepted notification"
        );
        Ok(())
    }

    fn platform_name(&self) -> &str {
        "webhook"
    }
}

/// Replace every `${NAME}` in `input` with the environment variable `NAME`.
fn expand_env(input: &str) -> Result<String, NotifyError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(NotifyError::Config(format!(
                "unterminated ${{...}} in: {input}"
            )));
        };
        let name = &after[..end];
        let value = std::env::var(name)
            .map_err(|_| NotifyError::Config(format!("environment variable {name} is not set")))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
