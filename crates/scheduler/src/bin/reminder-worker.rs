//! reminder-worker: runs the reminder scheduler against a JSON reminder file.
//!
//! Every tick re-reads the file, so reminders added or edited by other
//! processes are picked up within one interval. Due reminders are sent to
//! the configured notification channel and logged as they surface.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use nudge_core::config::load_dotenv;
use nudge_core::NudgeConfig;
use nudge_notify::{build_channel, build_renderer};
use nudge_scheduler::{JsonFileStore, ReminderScheduler, ReminderStore};

// ── CLI ─────────────────────────────────────────────────────────────

/// Reminder worker: notifies about due reminders until interrupted.
#[derive(Parser, Debug)]
#[command(name = "reminder-worker", version, about)]
struct Cli {
    /// Path to nudge.toml config file.
    #[arg(long, env = "NUDGE_CONFIG", default_value = "config/nudge.toml")]
    config: String,

    /// Reminder JSON file (overrides `store.path`).
    #[arg(long)]
    store: Option<PathBuf>,

    /// Tick period in milliseconds (overrides `scheduler.interval_ms`).
    #[arg(long)]
    interval_ms: Option<u64>,
}

fn load_config(cli: &Cli) -> anyhow::Result<NudgeConfig> {
    let mut config = match NudgeConfig::from_file(&cli.config) {
        Ok(cfg) => {
            info!(path = %cli.config, "loaded nudge config");
            cfg
        }
        Err(e) => {
            warn!(
                error = %e,
                path = %cli.config,
                "failed to load config, using defaults"
            );
            let mut cfg = NudgeConfig::default();
            cfg.apply_env_overrides();
            cfg
        }
    };

    if let Some(path) = &cli.store {
        config.store.path = path.clone();
    }
    if let Some(ms) = cli.interval_ms {
        config.scheduler.interval_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let store: Arc<dyn ReminderStore> = Arc::new(JsonFileStore::new(&config.store.path));
    let channel = Arc::new(build_channel(&config.notify)?);
    let renderer = build_renderer(&config.notify)?;

    let scheduler = ReminderScheduler::builder(store, Arc::clone(&channel))
        .config(config.scheduler.clone())
        .renderer(renderer)
        .build();

    let _active_log = scheduler.hub().subscribe(|active| {
        let ids: Vec<&str> = active.iter().map(|r| r.id.as_str()).collect();
        info!(count = active.len(), ids = ?ids, "active reminders");
    });

    if !channel.request_permission().await {
        warn!(
            channel = channel.platform_name(),
            "notification permission not granted, reminders will only be listed in-app"
        );
    }

    info!(
        store = %config.store.path.display(),
        interval_ms = config.scheduler.interval_ms,
        "reminder-worker starting"
    );
    scheduler.start().await;

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    scheduler.stop();
    info!("reminder-worker exited cleanly");

    Ok(())
}
