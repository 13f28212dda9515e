//! Source listing and manipulation within scenes.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};
use stagehand_obs::catalog;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/sources/{scene_name}
pub async fn list_sources(
    State(state): State<AppState>,
    Path(scene_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let listing = catalog::scene_sources(&state.gateway, &scene_name).await?;
    Ok(Json(serde_json::to_value(listing).unwrap_or_default()))
}

/// GET /api/source-preview/{source_name}
pub async fn source_preview(
    State(state): State<AppState>,
    Path(source_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let shot = state
        .gateway
        .call(
            "GetSourceScreenshot",
            json!({ "sourceName": source_name, "imageFormat": "png" }),
        )
        .await?;
    let preview = shot
        .get("imageData")
        .and_then(Value::as_str)
        .map_or(Value::Null, |data| {
            if data.starts_with("data:image") {
                Value::String(data.to_owned())
            } else {
                Value::String(format!("data:image/png;base64,{data}"))
            }
        });
    Ok(Json(json!({ "preview": preview })))
}

/// Body for `POST /api/toggle_source`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSourceRequest {
    scene_name: Option<String>,
    scene_item_id: Option<i64>,
    scene_item_enabled: Option<bool>,
}

/// POST /api/toggle_source
pub async fn toggle_source(
    State(state): State<AppState>,
    Json(body): Json<ToggleSourceRequest>,
) -> Result<Json<Value>, ApiError> {
    let scene_name = require(body.scene_name, "sceneName")?;
    let scene_item_id = require(body.scene_item_id, "sceneItemId")?;
    let enabled = require(body.scene_item_enabled, "sceneItemEnabled")?;
    state
        .gateway
        .call(
            "SetSceneItemEnabled",
            json!({
                "sceneName": scene_name,
                "sceneItemId": scene_item_id,
                "sceneItemEnabled": enabled,
            }),
        )
        .await?;
    Ok(Json(json!({ "success": true, "sceneItemEnabled": enabled })))
}

/// Body for `POST /api/set_position`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPositionRequest {
    scene_name: Option<String>,
    scene_item_id: Option<i64>,
    x: Option<f64>,
    y: Option<f64>,
}

/// POST /api/set_position
pub async fn set_position(
    State(state): State<AppState>,
    Json(body): Json<SetPositionRequest>,
) -> Result<Json<Value>, ApiError> {
    let scene_name = require(body.scene_name, "sceneName")?;
    let scene_item_id = require(body.scene_item_id, "sceneItemId")?;
    let x = require(body.x, "x")?;
    let y = require(body.y, "y")?;
    state
        .gateway
        .call(
            "SetSceneItemTransform",
            json!({
                "sceneName": scene_name,
                "sceneItemId": scene_item_id,
                "sceneItemTransform": { "positionX": x, "positionY": y },
            }),
        )
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// Body for `POST /api/move_source`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSourceRequest {
    scene_name: Option<String>,
    source_id: Option<i64>,
    x: Option<f64>,
    y: Option<f64>,
}

/// POST /api/move_source
pub async fn move_source(
    State(state): State<AppState>,
    Json(body): Json<MoveSourceRequest>,
) -> Result<Json<Value>, ApiError> {
    let scene_name = require(body.scene_name, "sceneName")?;
    let source_id = require(body.source_id, "sourceId")?;
    let x = require(body.x, "x")?;
    let y = require(body.y, "y")?;
    state
        .gateway
        .call(
            "SetSceneItemTransform",
            json!({
                "sceneName": scene_name,
                "sceneItemId": source_id,
                "sceneItemTransform": { "positionX": x, "positionY": y },
            }),
        )
        .await?;
    info!(scene = %scene_name, item = source_id, x, y, "moved source");
    Ok(Json(json!({
        "success": true,
        "moved": { "sourceId": source_id, "x": x, "y": y },
    })))
}

/// Body for `POST /api/add_source`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSourceRequest {
    scene_name: Option<String>,
    source_name: Option<String>,
    input_kind: Option<String>,
    #[serde(default)]
    input_settings: Value,
}

/// POST /api/add_source
///
/// Creates a brand-new input inside the scene, enabled immediately.
pub async fn add_source(
    State(state): State<AppState>,
    Json(body): Json<AddSourceRequest>,
) -> Result<Json<Value>, ApiError> {
    let scene_name = require(body.scene_name, "sceneName")?;
    let source_name = require(body.source_name, "sourceName")?;
    let input_kind = require(body.input_kind, "inputKind")?;
    let settings = if body.input_settings.is_object() {
        body.input_settings
    } else {
        json!({})
    };
    let created = state
        .gateway
        .call(
            "CreateInput",
            json!({
                "sceneName": scene_name,
                "inputName": source_name,
                "inputKind": input_kind,
                "inputSettings": settings,
                "sceneItemEnabled": true,
            }),
        )
        .await?;
    Ok(Json(json!({
        "success": true,
        "sceneItemId": created.get("sceneItemId").cloned().unwrap_or(Value::Null),
    })))
}

/// Body for `POST /api/delete_source`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSourceRequest {
    scene_name: Option<String>,
    scene_item_id: Option<i64>,
}

/// POST /api/delete_source
pub async fn delete_source(
    State(state): State<AppState>,
    Json(body): Json<DeleteSourceRequest>,
) -> Result<Json<Value>, ApiError> {
    let scene_name = require(body.scene_name, "sceneName")?;
    let scene_item_id = require(body.scene_item_id, "sceneItemId")?;
    state
        .gateway
        .call(
            "RemoveSceneItem",
            json!({ "sceneName": scene_name, "sceneItemId": scene_item_id }),
        )
        .await?;
    Ok(Json(json!({ "success": true })))
}

fn require<T>(value: Option<T>, name: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::validation(format!("{name} is required")))
}
