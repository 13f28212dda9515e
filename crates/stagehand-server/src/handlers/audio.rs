//! Audio mixer endpoints.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use stagehand_obs::catalog;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/audio-levels
///
/// Polled on a tight interval by the mixer view, so failures collapse
/// to an empty level map instead of an error response.
pub async fn audio_levels(State(state): State<AppState>) -> Json<Value> {
    let levels = match catalog::audio_levels(&state.gateway).await {
        Ok(levels) => levels,
        Err(err) => {
            debug!(error = %err, "audio level poll failed");
            Map::new()
        }
    };
    Json(Value::Object(levels))
}

/// Body for `POST /api/toggle_mute`. Sets explicit mute state so a
/// polling client never races its own toggle.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleMuteRequest {
    #[serde(alias = "inputName")]
    source_name: Option<String>,
    muted: Option<bool>,
}

/// POST /api/toggle_mute
pub async fn toggle_mute(
    State(state): State<AppState>,
    Json(body): Json<ToggleMuteRequest>,
) -> Result<Json<Value>, ApiError> {
    let source_name = body
        .source_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::validation("sourceName is required"))?;
    let muted = body
        .muted
        .ok_or_else(|| ApiError::validation("muted is required"))?;
    state
        .gateway
        .call(
            "SetInputMute",
            json!({ "inputName": source_name, "inputMuted": muted }),
        )
        .await?;
    Ok(Json(json!({ "success": true, "muted": muted })))
}

/// Body for `POST /api/set_volume`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVolumeRequest {
    #[serde(alias = "inputName")]
    source_name: Option<String>,
    volume: Option<f64>,
}

/// POST /api/set_volume
pub async fn set_volume(
    State(state): State<AppState>,
    Json(body): Json<SetVolumeRequest>,
) -> Result<Json<Value>, ApiError> {
    let input_name = body
        .source_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::validation("sourceName is required"))?;
    let volume = body
        .volume
        .ok_or_else(|| ApiError::validation("volume is required"))?;
    if !(0.0..=1.0).contains(&volume) {
        return Err(ApiError::validation("volume must be between 0 and 1"));
    }
    state
        .gateway
        .call(
            "SetInputVolume",
            json!({ "inputName": input_name, "inputVolumeMul": volume }),
        )
        .await?;
    Ok(Json(json!({ "success": true, "volume": volume })))
}
