// =====================================================================================
// LIVENESS TRACKER SERVICE
// =====================================================================================

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Last-known-good timestamps per watched device. Written by the state feed
/// handler and by the evaluator; latest write wins, the feed is close enough
/// to chronological that a reordering only causes a bounded error.
pub struct LivenessTracker {
    last_ok: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl LivenessTracker {
    pub fn new() -> Self {
        Self {
            last_ok: RwLock::new(HashMap::new()),
        }
    }

    /// Unconditional overwrite on any good signal from a bound source.
    pub async fn record_good(&self, device_id: &str, timestamp: DateTime<Utc>) {
        let mut last_ok = self.last_ok.write().await;
        last_ok.insert(device_id.to_string(), timestamp);
    }

    /// Startup grace: a freshly watched device is assumed healthy at the
    /// moment it is first seen, so it is never flagged down before a full
    /// timeout budget has elapsed. Only sets the baseline if absent.
    pub async fn ensure_initialized(&self, device_id: &str, now: DateTime<Utc>) {
        let mut last_ok = self.last_ok.write().await;
        last_ok.entry(device_id.to_string()).or_insert(now);
    }

    pub async fn last_ok(&self, device_id: &str) -> Option<DateTime<Utc>> {
        let last_ok = self.last_ok.read().await;
        last_ok.get(device_id).copied()
    }

    /// Drops entries for devices no longer in the watched set.
    pub async fn retain_watched(&self, watched: &HashSet<String>) {
        let mut last_ok = self.last_ok.write().await;
        last_ok.retain(|device_id, _| watched.contains(device_id));
    }
}

impl Default for LivenessTracker {
    fn default() -> Self {
        Self::new()
    }
}
