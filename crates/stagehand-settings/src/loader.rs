//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`StagehandSettings::default()`]
//! 2. If `~/.stagehand/settings.json` exists, deep-merge user values over
//!    defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::StagehandSettings;

/// Resolve the path to the settings file (`~/.stagehand/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".stagehand").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<StagehandSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<StagehandSettings> {
    let defaults = serde_json::to_value(StagehandSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: StagehandSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// The variable names are the ones the original dashboard shipped with, so
/// an existing `.env` keeps working. Invalid values are silently ignored
/// (fall back to file/default).
pub fn apply_env_overrides(settings: &mut StagehandSettings) {
    // ── OBS endpoint ────────────────────────────────────────────────
    if let Some(v) = read_env_string("OBS_HOST") {
        settings.obs.host = v;
    }
    if let Some(v) = read_env_u16("OBS_PORT", 1, 65535) {
        settings.obs.port = v;
    }
    if let Some(v) = read_env_string("OBS_PASSWORD") {
        settings.obs.password = v;
    }

    // ── Connection policy ───────────────────────────────────────────
    if let Some(v) = read_env_u32("OBS_MAX_ATTEMPTS", 1, 1000) {
        settings.obs.connection.max_attempts = v;
    }
    if let Some(v) = read_env_u64("CLIENT_TIMEOUT", 1000, 86_400_000) {
        settings.obs.connection.client_timeout_ms = v;
    }
    if let Some(v) = read_env_u64("CONNECTION_TIMEOUT", 100, 600_000) {
        settings.obs.connection.connection_timeout_ms = v;
    }

    // ── HTTP server ─────────────────────────────────────────────────
    if let Some(v) = read_env_string("SERVER_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_env_u16("SERVER_PORT", 1, 65535) {
        settings.server.port = v;
    }

    // ── Notifications / logging ─────────────────────────────────────
    if let Some(v) = read_env_string("DISCORD_WEBHOOK_URL") {
        settings.notify.discord_webhook_url = Some(v);
    }
    if let Some(v) = read_env_string("STAGEHAND_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_string("STAGEHAND_LOG_DIR") {
        settings.logging.dir = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    let val = std::env::var(name).ok()?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_simple_override() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": 10});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 10);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({
            "obs": {"port": 4455, "host": "localhost"}
        });
        let source = serde_json::json!({
            "obs": {"port": 4466}
        });
        let merged = deep_merge(target, source);
        assert_eq!(merged["obs"]["port"], 4466);
        assert_eq!(merged["obs"]["host"], "localhost");
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
    }

    #[test]
    fn merge_array_replaced_entirely() {
        let target = serde_json::json!({"a": [1, 2, 3]});
        let source = serde_json::json!({"a": [9]});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], serde_json::json!([9]));
    }

    #[test]
    fn merge_new_keys_added() {
        let target = serde_json::json!({"a": 1});
        let source = serde_json::json!({"b": 2});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    // ── parse helpers ───────────────────────────────────────────────

    #[test]
    fn parse_u16_in_range() {
        assert_eq!(parse_u16_range("4455", 1, 65535), Some(4455));
    }

    #[test]
    fn parse_u16_out_of_range() {
        assert_eq!(parse_u16_range("0", 1, 65535), None);
    }

    #[test]
    fn parse_u16_garbage() {
        assert_eq!(parse_u16_range("not-a-port", 1, 65535), None);
    }

    #[test]
    fn parse_u64_in_range() {
        assert_eq!(parse_u64_range("30000", 1000, 86_400_000), Some(30_000));
    }

    #[test]
    fn parse_u64_below_min() {
        assert_eq!(parse_u64_range("10", 1000, 86_400_000), None);
    }

    #[test]
    fn parse_u32_in_range() {
        assert_eq!(parse_u32_range("3", 1, 1000), Some(3));
    }

    // ── file loading ────────────────────────────────────────────────

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings =
            load_settings_from_path(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings.obs.port, 4455);
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"obs": {"host": "10.0.0.5"}, "server": {"port": 3000}}"#,
        )
        .unwrap();
        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.obs.host, "10.0.0.5");
        assert_eq!(settings.obs.port, 4455);
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{broken").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    #[test]
    fn settings_path_under_stagehand_dir() {
        let path = settings_path();
        assert!(path.to_string_lossy().contains(".stagehand"));
        assert!(path.to_string_lossy().ends_with("settings.json"));
    }
}
