//! In-app notification hub.
//!
//! Holds the ordered set of reminders currently surfaced to the user and
//! broadcasts the whole set to every subscriber whenever it changes.
//! Subscribers replace their view on each call; there are no diffs.
//!
//! Listeners run synchronously on the publishing task, after the hub's lock
//! is released, so a listener may call back into the hub.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use nudge_core::Reminder;
use tracing::debug;

/// A subscriber callback receiving the full active set.
pub type Listener = Arc<dyn Fn(&[Reminder]) + Send + Sync>;

#[derive(Default)]
struct HubState {
    active: Vec<Reminder>,
    listeners: Vec<(u64, Listener)>,
}

#[derive(Default)]
struct HubInner {
    state: Mutex<HubState>,
    next_listener_id: AtomicU64,
}

impl HubInner {
    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Publish/subscribe registry of surfaced reminders. Cheap to clone; clones
/// share state.
#[derive(Clone, Default)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

/// Handle returned by [`NotificationHub::subscribe`].
#[must_use = "keep the subscription to call `unsubscribe` later"]
pub struct Subscription {
    id: u64,
    hub: Weak<HubInner>,
}

impl Subscription {
    /// Stop receiving updates. Returns whether the listener was still
    /// registered.
    pub fn unsubscribe(self) -> bool {
        let Some(inner) = self.hub.upgrade() else {
            return false;
        };
        let mut state = inner.lock();
        let before = state.listeners.len();
        state.listeners.retain(|(id, _)| *id != self.id);
        state.listeners.len() != before
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` and immediately call it once with the current set.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[Reminder]) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let snapshot = {
            let mut state = self.inner.lock();
            state.listeners.push((id, Arc::clone(&listener)));
            state.active.clone()
        };
        listener(&snapshot);
        Subscription {
            id,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Add `reminder` to the end of the set unless its id is already
    /// present. Returns whether the set changed.
    pub fn publish_add(&self, reminder: Reminder) -> bool {
        let fan_out = {
            let mut state = self.inner.lock();
            if state.active.iter().any(|r| r.id == reminder.id) {
                return false;
            }
            debug!(reminder_id = %reminder.id, "surfacing reminder");
            state.active.push(reminder);
            Self::prepare_fan_out(&state)
        };
        Self::fan_out(fan_out);
        true
    }

    /// Remove the reminder with `id`. Returns whether the set changed.
    pub fn publish_remove(&self, id: &str) -> bool {
        let fan_out = {
            let mut state = self.inner.lock();
            let before = state.active.len();
            state.active.retain(|r| r.id != id);
            if state.active.len() == before {
                return false;
            }
            debug!(reminder_id = %id, "removing surfaced reminder");
            Self::prepare_fan_out(&state)
        };
        Self::fan_out(fan_out);
        true
    }

    /// Keep only reminders whose id is in `ids`, with a single fan-out.
    /// Returns how many were removed.
    pub fn retain_ids(&self, ids: &HashSet<String>) -> usize {
        let (removed, fan_out) = {
            let mut state = self.inner.lock();
            let before = state.active.len();
            state.active.retain(|r| ids.contains(&r.id));
            let removed = before - state.active.len();
            if removed == 0 {
                return 0;
            }
            (removed, Self::prepare_fan_out(&state))
        };
        Self::fan_out(fan_out);
        removed
    }

    /// Current active set.
    pub fn snapshot(&self) -> Vec<Reminder> {
        self.inner.lock().active.clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().active.iter().any(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    fn prepare_fan_out(state: &HubState) -> (Vec<Reminder>, Vec<Listener>) {
        let listeners = state.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
        (state.active.clone(), listeners)
    }

    fn fan_out((snapshot, listeners): (Vec<Reminder>, Vec<Listener>)) {
        for listener in listeners {
            listener(&snapshot);
        }
    }
}
