//! Shared state accessible from every handler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use stagehand_obs::gateway::Gateway;
use stagehand_obs::socket::{ControlDialer, ObsTarget};

use crate::notify::DiscordNotifier;

/// State threaded through the router.
#[derive(Clone)]
pub struct AppState {
    /// The one call gateway all handlers share.
    pub gateway: Arc<Gateway>,
    /// Dialer for the throwaway connection-verification probe. Kept
    /// separate so probes never touch the shared session.
    pub verify_dialer: Arc<dyn ControlDialer>,
    /// Target the probe falls back to for fields the caller omits.
    pub default_target: ObsTarget,
    /// Discord webhook notifier, when configured.
    pub notifier: Option<Arc<DiscordNotifier>>,
    /// Process start, for the health endpoint's uptime.
    pub start_time: Instant,
    /// Mirrored log file served by `/api/logs`, when logging to disk.
    pub log_path: Option<PathBuf>,
}
