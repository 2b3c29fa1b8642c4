use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use nudge_core::{Clock, Reminder, SchedulerConfig, SystemClock};
use nudge_notify::{NotificationChannel, NotificationRenderer};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::hub::NotificationHub;
use crate::store::ReminderStore;
use crate::tracker::DeliveryTracker;

/// State shared between the scheduler handle and its timer task.
pub(super) struct Shared {
    pub(super) interval: Duration,
    pub(super) store: Arc<dyn ReminderStore>,
    pub(super) channel: Arc<NotificationChannel>,
    pub(super) renderer: NotificationRenderer,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) hub: NotificationHub,
    pub(super) tracker: Mutex<DeliveryTracker>,
    /// Serializes ticks so two passes never interleave their bookkeeping.
    pub(super) tick_guard: tokio::sync::Mutex<()>,
}

impl Shared {
    pub(super) fn tracker(&self) -> MutexGuard<'_, DeliveryTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Timer body: one pass per period until aborted.
    async fn run_timer(self: Arc<Self>, mut ticker: Interval) {
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }
}

enum LoopState {
    Stopped,
    /// `start` is running its immediate pass.
    Starting,
    Running(JoinHandle<()>),
}

// ── Builder ─────────────────────────────────────────────────────────

/// Fluent builder for a [`ReminderScheduler`].
///
/// # Example
/// ```ignore
/// let scheduler = SchedulerBuilder::new(store, channel)
///     .config(SchedulerConfig::with_interval_ms(30_000))
///     .renderer(renderer)
///     .build();
/// ```
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    store: Arc<dyn ReminderStore>,
    channel: Arc<NotificationChannel>,
    renderer: NotificationRenderer,
    clock: Arc<dyn Clock>,
    hub: NotificationHub,
}

impl SchedulerBuilder {
    pub fn new(store: Arc<dyn ReminderStore>, channel: Arc<NotificationChannel>) -> Self {
        Self {
            config: SchedulerConfig::default(),
            store,
            channel,
            renderer: NotificationRenderer::default(),
            clock: Arc::new(SystemClock),
            hub: NotificationHub::new(),
        }
    }

    /// Set the tick period (default: 30s).
    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn renderer(mut self, renderer: NotificationRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replace the wall clock used for due checks.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use an existing hub, e.g. one UI code already subscribed to.
    pub fn hub(mut self, hub: NotificationHub) -> Self {
        self.hub = hub;
        self
    }

    pub fn build(self) -> ReminderScheduler {
        let interval = if self.config.interval_ms == 0 {
            let fallback = SchedulerConfig::default();
            warn!(
                interval_ms = fallback.interval_ms,
                "zero scheduler interval, using default"
            );
            fallback.interval()
        } else {
            self.config.interval()
        };

        ReminderScheduler {
            shared: Arc::new(Shared {
                interval,
                store: self.store,
                channel: self.channel,
                renderer: self.renderer,
                clock: self.clock,
                hub: self.hub,
                tracker: Mutex::new(DeliveryTracker::new()),
                tick_guard: tokio::sync::Mutex::new(()),
            }),
            state: Mutex::new(LoopState::Stopped),
        }
    }
}

// ── Scheduler ───────────────────────────────────────────────────────

/// Periodic due-reminder scheduler.
///
/// One instance owns the timer, the delivery tracker and the active set.
/// `start` is idempotent; `stop` cancels the timer but keeps the tracker and
/// active set, which describe what this process has already told the user.
pub struct ReminderScheduler {
    pub(super) shared: Arc<Shared>,
    state: Mutex<LoopState>,
}

/// Puts the loop back to `Stopped` if `start` is cancelled mid-pass.
struct StartingGuard<'a> {
    state: &'a Mutex<LoopState>,
    armed: bool,
}

impl Drop for StartingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if matches!(*state, LoopState::Starting) {
                *state = LoopState::Stopped;
            }
        }
    }
}

impl ReminderScheduler {
    pub fn builder(
        store: Arc<dyn ReminderStore>,
        channel: Arc<NotificationChannel>,
    ) -> SchedulerBuilder {
        SchedulerBuilder::new(store, channel)
    }

    fn state(&self) -> MutexGuard<'_, LoopState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one pass immediately, then arm the repeating timer.
    ///
    /// Returns `false` without doing anything if the scheduler is already
    /// running (or starting).
    pub async fn start(&self) -> bool {
        {
            let mut state = self.state();
            match &*state {
                LoopState::Running(handle) if !handle.is_finished() => {
                    debug!("scheduler already running, ignoring start");
                    return false;
                }
                LoopState::Starting => {
                    debug!("scheduler already starting, ignoring start");
                    return false;
                }
                _ => {}
            }
            *state = LoopState::Starting;
        }
        let mut guard = StartingGuard {
            state: &self.state,
            armed: true,
        };

        info!(
            interval_ms = self.shared.interval.as_millis() as u64,
            channel = self.shared.channel.platform_name(),
            "reminder scheduler starting"
        );
        self.shared.tick().await;

        let mut state = self.state();
        guard.armed = false;
        if !matches!(*state, LoopState::Starting) {
            // stop() ran during the immediate pass.
            debug!("scheduler stopped while starting, timer not armed");
            return false;
        }
        // Armed here rather than inside the task so the first period is
        // measured from the end of the immediate pass.
        let period = self.shared.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let handle = tokio::spawn(Arc::clone(&self.shared).run_timer(ticker));
        *state = LoopState::Running(handle);
        true
    }

    /// Cancel the timer. No tick fires after this returns; the tracker and
    /// active set are left as they are. Returns whether it was running.
    pub fn stop(&self) -> bool {
        let previous = std::mem::replace(&mut *self.state(), LoopState::Stopped);
        match previous {
            LoopState::Running(handle) => {
                handle.abort();
                info!("reminder scheduler stopped");
                true
            }
            LoopState::Starting => {
                info!("reminder scheduler stopped before timer was armed");
                true
            }
            LoopState::Stopped => false,
        }
    }

    pub fn is_running(&self) -> bool {
        match &*self.state() {
            LoopState::Running(handle) => !handle.is_finished(),
            LoopState::Starting => true,
            LoopState::Stopped => false,
        }
    }

    /// The hub UI code subscribes to.
    pub fn hub(&self) -> &NotificationHub {
        &self.shared.hub
    }

    /// Reminders currently surfaced in-app.
    pub fn active(&self) -> Vec<Reminder> {
        self.shared.hub.snapshot()
    }

    /// Whether `id` has already been notified in its current episode.
    pub fn is_tracked(&self, id: &str) -> bool {
        self.shared.tracker().is_tracked(id)
    }

    pub fn channel(&self) -> &NotificationChannel {
        &self.shared.channel
    }

    pub fn store(&self) -> &Arc<dyn ReminderStore> {
        &self.shared.store
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let LoopState::Running(handle) = state {
            handle.abort();
        }
    }
}
