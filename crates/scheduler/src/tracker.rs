//! Per-reminder delivery dedup.
//!
//! Tracks which reminder ids have already produced a notification attempt
//! in this process, so repeated ticks over a still-due reminder stay quiet.
//! An id's episode ends when it is [`reset`](DeliveryTracker::reset) or
//! pruned because the reminder left the incomplete list.
//!
//! Each reset also bumps the id's episode number. A tick reads the number
//! before delivering and records the attempt with
//! [`mark_notified_in`](DeliveryTracker::mark_notified_in), which refuses if
//! a reset happened while the delivery was in flight.

use std::collections::{HashMap, HashSet};

use tracing::debug;

/// Set of reminder ids that have already been notified.
#[derive(Debug, Default, Clone)]
pub struct DeliveryTracker {
    notified: HashSet<String>,
    /// Episode number per id, only for ids reset at least once.
    episodes: HashMap<String, u64>,
    last_episode: u64,
}

impl DeliveryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `id` has not been notified in its current episode.
    pub fn should_attempt_notify(&self, id: &str) -> bool {
        !self.notified.contains(id)
    }

    /// Current episode number of `id`.
    pub fn episode(&self, id: &str) -> u64 {
        self.episodes.get(id).copied().unwrap_or(0)
    }

    /// Record a notification attempt for `id`.
    pub fn mark_notified(&mut self, id: &str) {
        self.notified.insert(id.to_string());
    }

    /// Record an attempt made in `episode`. Returns `false`, recording
    /// nothing, if `id` has been reset since `episode` was read.
    pub fn mark_notified_in(&mut self, id: &str, episode: u64) -> bool {
        if self.episode(id) != episode {
            return false;
        }
        self.mark_notified(id);
        true
    }

    /// Forget `id` and start a new episode for it. Returns whether it was
    /// tracked.
    pub fn reset(&mut self, id: &str) -> bool {
        self.last_episode += 1;
        self.episodes.insert(id.to_string(), self.last_episode);
        self.notified.remove(id)
    }

    /// Drop every tracked id not in `active_ids`. Returns how many delivery
    /// records were dropped.
    pub fn prune_missing(&mut self, active_ids: &HashSet<String>) -> usize {
        let before = self.notified.len();
        self.notified.retain(|id| active_ids.contains(id));
        self.episodes.retain(|id, _| active_ids.contains(id));
        let pruned = before - self.notified.len();
        if pruned > 0 {
            debug!(pruned, "pruned delivery records for vanished reminders");
        }
        pruned
    }

    pub fn is_tracked(&self, id: &str) -> bool {
        self.notified.contains(id)
    }

    pub fn len(&self) -> usize {
        self.notified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notified.is_empty()
    }
}
