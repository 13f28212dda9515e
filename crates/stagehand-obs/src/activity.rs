//! Tracks which dashboard clients have been active recently.
//!
//! Every API request stamps its client id here; the connection manager
//! consults the tracker to decide whether the OBS link is still worth
//! keeping. Entries age out after a configurable quiet period.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Rolling record of recently seen client ids.
pub struct ClientTracker {
    timeout: Duration,
    seen: Mutex<HashMap<String, Instant>>,
}

impl ClientTracker {
    /// A tracker that forgets clients quiet for longer than `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Records activity for `client_id`, resetting its quiet clock.
    pub fn mark(&self, client_id: &str) {
        self.seen
            .lock()
            .insert(client_id.to_owned(), Instant::now());
    }

    /// Drops every client whose last activity is older than the
    /// timeout. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let now = Instant::now();
        let mut seen = self.seen.lock();
        let before = seen.len();
        seen.retain(|_, last| now.duration_since(*last) < self.timeout);
        let removed = before - seen.len();
        if removed > 0 {
            debug!(removed, remaining = seen.len(), "pruned inactive clients");
        }
        removed
    }

    /// Whether any client survives a prune right now.
    ///
    /// Pure observation: expired entries are not removed here.
    pub fn has_active(&self) -> bool {
        let now = Instant::now();
        self.seen
            .lock()
            .values()
            .any(|last| now.duration_since(*last) < self.timeout)
    }

    /// Number of tracked clients, stale entries included.
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// True when no clients are tracked at all.
    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}
