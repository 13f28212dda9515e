//! Shared constants.

/// Width of scene preview screenshots requested from OBS.
pub const PREVIEW_WIDTH: u32 = 320;
/// Height of scene preview screenshots requested from OBS.
pub const PREVIEW_HEIGHT: u32 = 180;
/// JPEG compression quality for scene previews.
pub const PREVIEW_QUALITY: u32 = 70;

/// Default obs-websocket port.
pub const DEFAULT_OBS_PORT: u16 = 4455;
/// Default HTTP server port.
pub const DEFAULT_SERVER_PORT: u16 = 2000;
