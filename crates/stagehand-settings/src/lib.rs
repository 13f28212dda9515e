//! # stagehand-settings
//!
//! Configuration management with layered sources for Stagehand.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`StagehandSettings::default()`]
//! 2. **User file** — `~/.stagehand/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — highest priority; the variable names match
//!    the ones the dashboard has always used (`OBS_HOST`, `OBS_PORT`,
//!    `OBS_PASSWORD`, `SERVER_PORT`, ...)
//!
//! All values are immutable after process start: the binary loads once and
//! passes the result down by reference.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
