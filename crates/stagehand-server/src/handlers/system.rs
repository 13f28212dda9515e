//! Health, status, connection verification, and log access.

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use stagehand_obs::socket::ObsTarget;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Upper bound on a verification probe dial.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(3);

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptimeSecs": state.start_time.elapsed().as_secs(),
        "activeClients": state.gateway.tracker().len(),
        "obsConnected": state.gateway.manager().is_connected().await,
    }))
}

/// GET /api/obs-status
///
/// The dashboard polls this, so a dead OBS is a 200 with
/// `connected: false` rather than an error.
pub async fn obs_status(State(state): State<AppState>) -> Json<Value> {
    match state.gateway.call("GetStreamStatus", json!({})).await {
        Ok(status) => Json(json!({
            "connected": true,
            "streaming": status.get("outputActive").and_then(Value::as_bool).unwrap_or(false),
            "streamTimecode": status.get("outputTimecode").cloned().unwrap_or(Value::Null),
        })),
        Err(err) => Json(json!({ "connected": false, "error": err.to_string() })),
    }
}

/// GET /api/verify-connection
pub async fn verify_connection(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let version = state.gateway.call("GetVersion", json!({})).await?;
    Ok(Json(json!({
        "connected": true,
        "obsVersion": version.get("obsVersion").cloned().unwrap_or(Value::Null),
        "obsWebSocketVersion": version.get("obsWebSocketVersion").cloned().unwrap_or(Value::Null),
    })))
}

/// Body for `POST /api/verify-connection`. Missing fields fall back to
/// the configured target.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    host: Option<String>,
    port: Option<u16>,
    password: Option<String>,
}

/// POST /api/verify-connection
///
/// Dials a caller-supplied target once and throws the session away.
/// The shared OBS link is never touched, so a bad probe cannot break
/// an active dashboard.
pub async fn verify_custom_connection(
    State(state): State<AppState>,
    Json(body): Json<VerifyRequest>,
) -> Json<Value> {
    let target = ObsTarget {
        host: body.host.unwrap_or_else(|| state.default_target.host.clone()),
        port: body.port.unwrap_or(state.default_target.port),
        password: body
            .password
            .unwrap_or_else(|| state.default_target.password.clone()),
    };
    let url = target.url();
    match tokio::time::timeout(VERIFY_TIMEOUT, state.verify_dialer.dial(&target)).await {
        Ok(Ok(session)) => {
            session.close().await;
            info!(%url, "connection verification succeeded");
            Json(json!({ "success": true }))
        }
        Ok(Err(err)) => Json(json!({ "success": false, "error": err.to_string() })),
        Err(_) => Json(json!({
            "success": false,
            "error": format!("connection attempt to {url} timed out"),
        })),
    }
}

/// GET /api/logs
///
/// Always a 200. A missing or unreadable log file becomes a placeholder
/// message so the dashboard's log pane renders something either way.
pub async fn logs(State(state): State<AppState>) -> Json<Value> {
    let contents = match &state.log_path {
        Some(path) => tokio::fs::read_to_string(path).await.ok(),
        None => None,
    };
    let logs =
        contents.unwrap_or_else(|| "No logs found or error reading log file.".to_owned());
    Json(json!({ "logs": logs }))
}
