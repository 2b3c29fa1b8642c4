use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

// ── Top-level config ──────────────────────────────────────────

/// Full configuration for the reminder engine.
///
/// Parsed from `nudge.toml`; every section is optional. Environment
/// variables named `NUDGE_SECTION_KEY` override individual keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NudgeConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub notify: NotifyConfig,
}

// ── Section configs ───────────────────────────────────────────

/// Scheduler loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Period between due-check ticks, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    30_000
}

impl SchedulerConfig {
    pub fn with_interval_ms(interval_ms: u64) -> Self {
        Self { interval_ms }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

/// Where the worker keeps its reminder list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("reminders.json")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// External notification channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// `"console"`, `"webhook"` or `"none"`.
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Target URL for the webhook channel. `${VAR}` references are expanded.
    pub webhook_url: Option<String>,

    /// HTTP method for the webhook channel (defaults to POST).
    pub webhook_method: Option<String>,

    /// Per-request timeout for the webhook channel, in milliseconds.
    #[serde(default = "default_webhook_timeout_ms")]
    pub webhook_timeout_ms: u64,

    /// Extra headers sent with every webhook request.
    #[serde(default)]
    pub webhook_headers: HashMap<String, String>,

    /// minijinja template for the notification title.
    #[serde(default = "default_title_template")]
    pub title_template: String,

    /// minijinja template for the notification body.
    #[serde(default = "default_body_template")]
    pub body_template: String,
}

fn default_channel() -> String {
    "console".into()
}

fn default_webhook_timeout_ms() -> u64 {
    10_000
}

fn default_title_template() -> String {
    "Reminder".into()
}

fn default_body_template() -> String {
    "{{ text }}{% if notes %}\n{{ notes }}{% endif %}".into()
}

impl NotifyConfig {
    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_millis(self.webhook_timeout_ms)
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            webhook_url: None,
            webhook_method: None,
            webhook_timeout_ms: default_webhook_timeout_ms(),
            webhook_headers: HashMap::new(),
            title_template: default_title_template(),
            body_template: default_body_template(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────

impl NudgeConfig {
    /// Parse config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, CoreError> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Apply environment variable overrides.
    ///
    /// - `NUDGE_SCHEDULER_INTERVAL_MS` -> `scheduler.interval_ms`
    /// - `NUDGE_STORE_PATH` -> `store.path`
    /// - `NUDGE_NOTIFY_CHANNEL` -> `notify.channel`
    /// - `NUDGE_NOTIFY_WEBHOOK_URL` -> `notify.webhook_url`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("NUDGE_SCHEDULER_INTERVAL_MS") {
            if let Ok(ms) = v.parse::<u64>() {
                self.scheduler.interval_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("NUDGE_STORE_PATH") {
            self.store.path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("NUDGE_NOTIFY_CHANNEL") {
            self.notify.channel = v;
        }
        if let Ok(v) = std::env::var("NUDGE_NOTIFY_WEBHOOK_URL") {
            self.notify.webhook_url = Some(v);
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.scheduler.interval_ms == 0 {
            return Err(CoreError::Config(
                "scheduler.interval_ms must be greater than zero".into(),
            ));
        }
        if self.notify.webhook_timeout_ms == 0 {
            return Err(CoreError::Config(
                "notify.webhook_timeout_ms must be greater than zero".into(),
            ));
        }
        match self.notify.channel.as_str() {
            "console" | "none" => Ok(()),
            "webhook" if self.notify.webhook_url.is_some() => Ok(()),
            "webhook" => Err(CoreError::Config(
                "notify.webhook_url is required when notify.channel = \"webhook\"".into(),
            )),
            other => Err(CoreError::Config(format!("unknown notify.channel: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: NudgeConfig = toml::from_str("").unwrap();
        assert_eq!(config.scheduler.interval_ms, 30_000);
        assert_eq!(config.scheduler.interval(), Duration::from_secs(30));
        assert_eq!(config.store.path, PathBuf::from("reminders.json"));
        assert_eq!(config.notify.channel, "console");
        assert_eq!(config.notify.title_template, "Reminder");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sections_parse() {
        let config: NudgeConfig = toml::from_str(
            r#"
            [scheduler]
            interval_ms = 500

            [store]
            path = "/tmp/r.json"

            [notify]
            channel = "webhook"
            webhook_url = "https://hooks.example.com/r"
            webhook_headers = { "X-Token" = "abc" }
            "#,
        )
        .unwrap();
        assert_eq!(config.scheduler.interval_ms, 500);
        assert_eq!(config.store.path, PathBuf::from("/tmp/r.json"));
        assert_eq!(config.notify.channel, "webhook");
        assert_eq!(config.notify.webhook_headers["X-Token"], "abc");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config: NudgeConfig = toml::from_str("[scheduler]\ninterval_ms = 0").unwrap();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn webhook_without_url_is_rejected() {
        let config: NudgeConfig = toml::from_str("[notify]\nchannel = \"webhook\"").unwrap();
        match config.validate() {
            Err(CoreError::Config(msg)) => assert!(msg.contains("webhook_url")),
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn unknown_channel_is_rejected() {
        let config: NudgeConfig = toml::from_str("[notify]\nchannel = \"pager\"").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = NudgeConfig::from_toml("[scheduler\ninterval_ms = 1");
        assert!(matches!(result, Err(CoreError::ConfigParse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = NudgeConfig::from_file("/definitely/not/here/nudge.toml");
        assert!(matches!(result, Err(CoreError::ConfigIo(_))));
    }

    #[test]
    fn webhook_timeout_defaults_and_must_be_positive() {
        let config: NudgeConfig = toml::from_str("").unwrap();
        assert_eq!(config.notify.webhook_timeout(), Duration::from_secs(10));

        let config: NudgeConfig =
            toml::from_str("[notify]\nwebhook_timeout_ms = 0").unwrap();
        match config.validate() {
            Err(CoreError::Config(msg)) => assert!(msg.contains("webhook_timeout_ms")),
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn env_overrides_replace_file_values() {
        std::env::set_var("NUDGE_SCHEDULER_INTERVAL_MS", "1500");
        std::env::set_var("NUDGE_STORE_PATH", "/var/lib/nudge/r.json");
        std::env::set_var("NUDGE_NOTIFY_CHANNEL", "webhook");
        std::env::set_var("NUDGE_NOTIFY_WEBHOOK_URL", "https://hooks.example.com/env");

        let result = NudgeConfig::from_toml(
            r#"
            [scheduler]
            interval_ms = 500

            [notify]
            channel = "console"
            "#,
        );

        // An unparsable interval is ignored rather than zeroing the setting.
        std::env::set_var("NUDGE_SCHEDULER_INTERVAL_MS", "soon");
        let mut fallback = NudgeConfig::default();
        fallback.apply_env_overrides();

        for key in [
            "NUDGE_SCHEDULER_INTERVAL_MS",
            "NUDGE_STORE_PATH",
            "NUDGE_NOTIFY_CHANNEL",
            "NUDGE_NOTIFY_WEBHOOK_URL",
        ] {
            std::env::remove_var(key);
        }

        let config = result.unwrap();
        assert_eq!(config.scheduler.interval_ms, 1500);
        assert_eq!(config.store.path, PathBuf::from("/var/lib/nudge/r.json"));
        assert_eq!(config.notify.channel, "webhook");
        assert_eq!(
            config.notify.webhook_url.as_deref(),
            Some("https://hooks.example.com/env")
        );

        assert_eq!(fallback.scheduler.interval_ms, 30_000);
        assert_eq!(fallback.notify.channel, "webhook");
    }
}
