//! Connection lifecycle for the single OBS link.
//!
//! One [`ConnectionManager`] owns at most one live session. Connects
//! are lazy and serialized: the link mutex is held across the dial, so
//! concurrent callers queue up and all but the first find the session
//! already established. Teardown happens on call failure, on idleness,
//! or on explicit disconnect, and the next request simply dials again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::activity::ClientTracker;
use crate::socket::{ControlDialer, ControlSession, ObsTarget};

/// Tunables for connect behaviour.
#[derive(Clone, Copy, Debug)]
pub struct ConnectPolicy {
    /// Attempt count at which failures escalate to a louder log line.
    /// Never a lockout; dialing continues as long as requests arrive.
    pub max_attempts: u32,
    /// Upper bound on a single dial, handshake included.
    pub connect_timeout: Duration,
}

impl Default for ConnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Default)]
struct Link {
    session: Option<Arc<dyn ControlSession>>,
    attempts: u32,
}

/// Owns the one OBS session and the rules for creating and dropping it.
pub struct ConnectionManager {
    dialer: Arc<dyn ControlDialer>,
    target: ObsTarget,
    policy: ConnectPolicy,
    link: Mutex<Link>,
}

impl ConnectionManager {
    /// A manager that dials `target` through `dialer` on demand.
    pub fn new(dialer: Arc<dyn ControlDialer>, target: ObsTarget, policy: ConnectPolicy) -> Self {
        Self {
            dialer,
            target,
            policy,
            link: Mutex::new(Link::default()),
        }
    }

    /// Returns the live session, dialing first if none exists.
    ///
    /// The lock is held for the whole dial, so overlapping callers
    /// produce exactly one connect attempt between them. `None` means
    /// this attempt failed; the failure counter survives until a dial
    /// succeeds.
    pub async fn ensure_connected(&self) -> Option<Arc<dyn ControlSession>> {
        let mut link = self.link.lock().await;
        if let Some(session) = &link.session {
            return Some(Arc::clone(session));
        }

        let url = self.target.url();
        let dialed =
            tokio::time::timeout(self.policy.connect_timeout, self.dialer.dial(&self.target))
                .await;
        let failure = match dialed {
            Ok(Ok(session)) => {
                link.attempts = 0;
                link.session = Some(Arc::clone(&session));
                info!(%url, "connected to OBS");
                return Some(session);
            }
            Ok(Err(err)) => err.to_string(),
            Err(_) => format!(
                "connect timed out after {}ms",
                self.policy.connect_timeout.as_millis()
            ),
        };

        link.attempts += 1;
        error!(%url, attempt = link.attempts, %failure, "OBS connect attempt failed");
        if link.attempts >= self.policy.max_attempts {
            warn!(
                attempts = link.attempts,
                "repeated OBS connect failures, will keep retrying on demand"
            );
        }
        None
    }

    /// Whether a session is currently held.
    pub async fn is_connected(&self) -> bool {
        self.link.lock().await.session.is_some()
    }

    /// Consecutive failed connect attempts since the last success.
    pub async fn attempts(&self) -> u32 {
        self.link.lock().await.attempts
    }

    /// Drops the session after a call failure. The next
    /// [`ensure_connected`](Self::ensure_connected) dials fresh.
    pub async fn mark_failed(&self) {
        let taken = self.link.lock().await.session.take();
        if let Some(session) = taken {
            warn!("dropping OBS session after call failure");
            session.close().await;
        }
    }

    /// Tears the session down when no tracked client is active.
    ///
    /// Stale client entries are pruned first, so a burst of traffic
    /// followed by silence releases the link within one call.
    pub async fn disconnect_if_idle(&self, tracker: &ClientTracker) {
        tracker.prune();
        if tracker.has_active() {
            return;
        }
        let taken = self.link.lock().await.session.take();
        if let Some(session) = taken {
            info!("no active clients, disconnecting from OBS");
            session.close().await;
        }
    }

    /// Unconditional teardown. Safe to call with no session held.
    pub async fn disconnect(&self) {
        let taken = self.link.lock().await.session.take();
        if let Some(session) = taken {
            info!("disconnected from OBS");
            session.close().await;
        }
    }
}
