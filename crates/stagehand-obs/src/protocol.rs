//! Wire-level pieces of the obs-websocket v5 protocol.
//!
//! Only the handful of frames Stagehand actually exchanges are modelled
//! here: the `Hello`/`Identify`/`Identified` handshake and the
//! request/response pair. Everything rides inside a `{op, d}` envelope.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

/// RPC version Stagehand negotiates during `Identify`.
pub const RPC_VERSION: u64 = 1;

/// Status code obs-websocket returns when a named resource does not exist.
pub const STATUS_RESOURCE_NOT_FOUND: u16 = 600;

/// Opcodes for the frames the client sends or receives.
pub mod op {
    /// Server greeting, carries the auth challenge when auth is enabled.
    pub const HELLO: u8 = 0;
    /// Client response to `Hello`.
    pub const IDENTIFY: u8 = 1;
    /// Server confirmation that the session is usable.
    pub const IDENTIFIED: u8 = 2;
    /// Client request.
    pub const REQUEST: u8 = 6;
    /// Server response to a request.
    pub const REQUEST_RESPONSE: u8 = 7;
}

// ── incoming frames ──────────────────────────────────────────────────

/// The `{op, d}` envelope every obs-websocket message travels in.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Opcode, see [`op`].
    pub op: u8,
    /// Opcode-specific payload.
    #[serde(default)]
    pub d: Value,
}

/// Payload of a `Hello` frame.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
    /// Present when the server requires authentication.
    pub authentication: Option<AuthChallenge>,
}

/// Challenge material from a `Hello` frame.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthChallenge {
    /// Per-connection challenge string.
    pub challenge: String,
    /// Server-configured salt.
    pub salt: String,
}

/// The `requestStatus` object inside a request response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatus {
    /// Whether the request succeeded.
    pub result: bool,
    /// Numeric status code; only meaningful when `result` is false.
    #[serde(default)]
    pub code: u16,
    /// Optional human-readable failure detail.
    #[serde(default)]
    pub comment: Option<String>,
}

// ── outgoing frames ──────────────────────────────────────────────────

/// Builds the `Identify` frame answering a `Hello`.
///
/// Event subscriptions are zeroed: Stagehand polls, it never listens.
pub fn identify_frame(authentication: Option<&str>) -> Value {
    let mut d = json!({
        "rpcVersion": RPC_VERSION,
        "eventSubscriptions": 0,
    });
    if let (Some(token), Some(map)) = (authentication, d.as_object_mut()) {
        map.insert("authentication".into(), Value::String(token.into()));
    }
    json!({ "op": op::IDENTIFY, "d": d })
}

/// Builds a request frame carrying `request_data` under a fresh id.
pub fn request_frame(request_type: &str, request_id: &str, request_data: &Value) -> Value {
    json!({
        "op": op::REQUEST,
        "d": {
            "requestType": request_type,
            "requestId": request_id,
            "requestData": request_data,
        },
    })
}

/// Computes the authentication token for an `Identify` frame.
///
/// The digest is `base64(sha256(base64(sha256(password + salt)) + challenge))`
/// as defined by the obs-websocket handshake.
pub fn auth_token(password: &str, salt: &str, challenge: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    let secret = BASE64.encode(hasher.finalize());

    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(challenge.as_bytes());
    BASE64.encode(hasher.finalize())
}
