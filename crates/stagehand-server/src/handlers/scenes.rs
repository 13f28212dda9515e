//! Scene listing, switching, previews, and layout export.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use stagehand_core::errors::ControlError;
use stagehand_obs::catalog;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/scenes
pub async fn list_scenes(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let scenes = catalog::scenes_with_previews(&state.gateway).await?;
    Ok(Json(json!({ "scenes": scenes })))
}

/// GET /api/active-scene
pub async fn active_scene(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let current = state
        .gateway
        .call("GetCurrentProgramScene", json!({}))
        .await?;
    Ok(Json(json!({
        "activeScene": current
            .get("currentProgramSceneName")
            .cloned()
            .unwrap_or(Value::Null),
    })))
}

/// Body for `POST /api/switch_scene`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchSceneRequest {
    scene_name: Option<String>,
}

/// POST /api/switch_scene
pub async fn switch_scene(
    State(state): State<AppState>,
    Json(body): Json<SwitchSceneRequest>,
) -> Result<Json<Value>, ApiError> {
    let scene_name = body
        .scene_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::validation("sceneName is required"))?;
    state
        .gateway
        .call(
            "SetCurrentProgramScene",
            json!({ "sceneName": scene_name }),
        )
        .await?;
    info!(scene = %scene_name, "switched program scene");
    Ok(Json(json!({ "success": true, "activeScene": scene_name })))
}

/// GET /api/scene-previews
///
/// Bulk snapshot refresh. Requires a live link: walking every scene
/// just to fail every screenshot is pointless.
pub async fn scene_previews(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if !state.gateway.manager().is_connected().await {
        return Err(ControlError::unavailable("OBS not available").into());
    }
    let previews = catalog::scene_previews(&state.gateway).await?;
    Ok(Json(json!({ "previews": previews })))
}

/// GET /api/export-config
pub async fn export_config(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let layout = catalog::export_layout(&state.gateway).await?;
    Ok(Json(layout))
}
