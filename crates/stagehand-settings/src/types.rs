//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON
//! wire format the dashboard writes. Each type implements [`Default`] with
//! production default values. Types marked with `#[serde(default)]` allow
//! partial JSON — missing fields get their default value during
//! deserialization.

use serde::{Deserialize, Serialize};

/// Root settings type for Stagehand.
///
/// Loaded from `~/.stagehand/settings.json` with defaults applied for
/// missing fields. Environment variables can override specific values.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StagehandSettings {
    /// Settings schema version.
    pub version: String,
    /// OBS connection settings.
    pub obs: ObsSettings,
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Outbound notification settings.
    pub notify: NotifySettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for StagehandSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            obs: ObsSettings::default(),
            server: ServerSettings::default(),
            notify: NotifySettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// OBS websocket endpoint and connection policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObsSettings {
    /// obs-websocket host.
    pub host: String,
    /// obs-websocket port.
    pub port: u16,
    /// obs-websocket password (shared secret).
    pub password: String,
    /// Connection lifecycle policy.
    pub connection: ConnectionSettings,
}

impl Default for ObsSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 4455,
            password: "test123".to_string(),
            connection: ConnectionSettings::default(),
        }
    }
}

/// Connection lifecycle policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionSettings {
    /// Attempt count at which a warning is logged. Never a lockout: the
    /// manager keeps retrying on every new request.
    pub max_attempts: u32,
    /// Milliseconds of client inactivity before an activity record is
    /// considered stale.
    pub client_timeout_ms: u64,
    /// Milliseconds to wait for a connect attempt before giving up on it.
    pub connection_timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            client_timeout_ms: 30_000,
            connection_timeout_ms: 5_000,
        }
    }
}

/// HTTP server network settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 2000,
        }
    }
}

/// Outbound notification settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifySettings {
    /// Discord webhook URL for stream/record start-stop announcements.
    /// Notifications are disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord_webhook_url: Option<String>,
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Log level filter (`trace`..`error`).
    pub level: String,
    /// Directory for the mirrored log file.
    pub dir: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
        }
    }
}
