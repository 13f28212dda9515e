//! # stagehand
//!
//! Server binary: loads settings, wires the OBS connection stack to
//! the HTTP surface, and serves until ctrl-c.

#![deny(unsafe_code)]

mod logging;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use stagehand_obs::activity::ClientTracker;
use stagehand_obs::gateway::Gateway;
use stagehand_obs::manager::{ConnectPolicy, ConnectionManager};
use stagehand_obs::socket::{ControlDialer, ObsDialer, ObsTarget};
use stagehand_server::notify::DiscordNotifier;
use stagehand_server::{AppState, router};
use stagehand_settings::loader;
use stagehand_settings::types::StagehandSettings;

/// OBS remote-control gateway.
#[derive(Parser, Debug)]
#[command(name = "stagehand", about = "OBS remote-control gateway")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the settings file (defaults to `~/.stagehand/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn load_settings(path: &std::path::Path) -> StagehandSettings {
    loader::load_settings_from_path(path).unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings_path = args.settings.clone().unwrap_or_else(loader::settings_path);
    let settings = load_settings(&settings_path);
    let (log_path, _log_guard) = logging::init(&settings.logging);

    let host = args.host.unwrap_or_else(|| settings.server.host.clone());
    let port = args.port.unwrap_or(settings.server.port);

    let target = ObsTarget {
        host: settings.obs.host.clone(),
        port: settings.obs.port,
        password: settings.obs.password.clone(),
    };
    let policy = ConnectPolicy {
        max_attempts: settings.obs.connection.max_attempts,
        connect_timeout: Duration::from_millis(settings.obs.connection.connection_timeout_ms),
    };
    let tracker = Arc::new(ClientTracker::new(Duration::from_millis(
        settings.obs.connection.client_timeout_ms,
    )));
    let dialer: Arc<dyn ControlDialer> = Arc::new(ObsDialer);
    let manager = Arc::new(ConnectionManager::new(
        Arc::clone(&dialer),
        target.clone(),
        policy,
    ));
    let gateway = Arc::new(Gateway::new(Arc::clone(&manager), tracker));

    let notifier = settings
        .notify
        .discord_webhook_url
        .as_ref()
        .map(|url| Arc::new(DiscordNotifier::new(url.clone())));
    if notifier.is_some() {
        tracing::info!("discord notifications enabled");
    }

    let state = AppState {
        gateway,
        verify_dialer: dialer,
        default_target: target,
        notifier,
        start_time: Instant::now(),
        log_path,
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))?;
    let addr = listener.local_addr().context("failed to read bind address")?;
    tracing::info!(
        obs = %settings.obs.host,
        obs_port = settings.obs.port,
        "Stagehand listening on http://{addr}"
    );

    let manager_for_shutdown = Arc::clone(&manager);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutting down");
        manager_for_shutdown.disconnect().await;
    })
    .await
    .context("server error")?;

    tracing::info!("shutdown complete");
    Ok(())
}
