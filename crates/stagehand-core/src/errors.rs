//! Error taxonomy for control calls.
//!
//! Every call that goes through the gateway resolves to either a JSON value
//! or a [`ControlError`]. The four variants map one-to-one onto HTTP
//! response classes:
//!
//! - [`ControlError::Unavailable`] — no live OBS session could be
//!   established (service unavailable)
//! - [`ControlError::Protocol`] — the session was live but the call itself
//!   failed (internal error, carries the obs-websocket status code when one
//!   was reported)
//! - [`ControlError::NotFound`] — a referenced scene/group/source does not
//!   exist (client error)
//! - [`ControlError::Validation`] — malformed request parameters (client
//!   error)

use thiserror::Error;

// ── Error code constants ────────────────────────────────────────────

/// No live OBS session could be established.
pub const OBS_UNAVAILABLE: &str = "OBS_UNAVAILABLE";
/// The session was live but the protocol call failed.
pub const PROTOCOL_ERROR: &str = "PROTOCOL_ERROR";
/// Referenced scene, group, or source does not exist.
pub const NOT_FOUND: &str = "NOT_FOUND";
/// Missing or malformed request parameters.
pub const INVALID_PARAMS: &str = "INVALID_PARAMS";

/// Error type shared by the gateway, aggregation layer, and HTTP handlers.
#[derive(Debug, Error)]
pub enum ControlError {
    /// OBS could not be reached; the caller may re-poll.
    #[error("{message}")]
    Unavailable {
        /// Description of why the connection is down.
        message: String,
    },

    /// The control-protocol call itself failed.
    #[error("{message}")]
    Protocol {
        /// Human-readable message, usually the obs-websocket comment.
        message: String,
        /// obs-websocket request status code, when one was reported.
        code: Option<u16>,
    },

    /// Referenced resource does not exist.
    #[error("{message}")]
    NotFound {
        /// Description naming the missing resource.
        message: String,
    },

    /// Malformed request parameters.
    #[error("{message}")]
    Validation {
        /// Description of what is wrong.
        message: String,
    },
}

impl ControlError {
    /// Create an [`ControlError::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a [`ControlError::Protocol`] without a status code.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
            code: None,
        }
    }

    /// Create a [`ControlError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a [`ControlError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Machine-readable error code for this variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => OBS_UNAVAILABLE,
            Self::Protocol { .. } => PROTOCOL_ERROR,
            Self::NotFound { .. } => NOT_FOUND,
            Self::Validation { .. } => INVALID_PARAMS,
        }
    }
}
