//! Tracing setup: stdout plus a non-blocking file mirror.
//!
//! The file mirror backs the dashboard's log viewer, so it stays ANSI
//! free. When the log directory cannot be created, logging degrades to
//! stdout only and the viewer endpoint reports the file as missing.

use std::path::PathBuf;

use stagehand_settings::types::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Name of the mirrored log file inside the configured directory.
const LOG_FILE: &str = "stagehand.log";

/// Keeps the non-blocking writer flushing; drop at process exit.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Installs the global subscriber and returns the mirror file path
/// (when file logging is active) plus the guard to hold onto.
pub fn init(settings: &LoggingSettings) -> (Option<PathBuf>, LogGuard) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.clone()));
    let stdout_layer = fmt::layer();

    let dir = PathBuf::from(&settings.dir);
    match std::fs::create_dir_all(&dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_ansi(false).with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .with(file_layer)
                .init();
            (Some(dir.join(LOG_FILE)), LogGuard { _file: Some(guard) })
        }
        Err(err) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .init();
            tracing::warn!(
                dir = %dir.display(),
                error = %err,
                "cannot create log directory, file mirror disabled"
            );
            (None, LogGuard { _file: None })
        }
    }
}
