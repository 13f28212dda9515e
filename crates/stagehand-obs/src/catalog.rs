//! Aggregate views composed from multiple obs-websocket requests.
//!
//! These are the shapes the dashboard renders directly: the scene grid
//! with thumbnails, the per-scene source list with groups expanded one
//! level, the audio mixer entries, and the full layout export. Partial
//! failures degrade the affected entry instead of failing the view.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value, json};
use stagehand_core::constants::{PREVIEW_HEIGHT, PREVIEW_QUALITY, PREVIEW_WIDTH};
use stagehand_core::errors::ControlError;
use tracing::{debug, warn};

use crate::gateway::Gateway;

// ── view types ───────────────────────────────────────────────────────

/// One scene with an optional inline thumbnail.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePreview {
    /// Scene name as OBS reports it.
    pub name: String,
    /// Base64 data URI, or `None` when the screenshot failed.
    pub preview: Option<String>,
}

/// A plain visual source inside a scene.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualSource {
    /// Scene item id, unique within its scene.
    pub id: i64,
    /// Source name.
    pub name: String,
    /// OBS source type string.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the item is enabled in its scene.
    pub visible: bool,
    /// Canvas position, zero when the transform lookup failed.
    pub x: f64,
    /// Canvas position, zero when the transform lookup failed.
    pub y: f64,
}

/// A source listed from inside a group.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupItem {
    /// Scene item id within the group.
    pub id: i64,
    /// Source name.
    pub name: String,
    /// OBS source type string.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the item is enabled.
    pub visible: bool,
    /// Always true; lets the dashboard indent group members.
    pub is_group_item: bool,
    /// Name of the enclosing group.
    pub parent_group: String,
}

/// A group with its direct members expanded.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSource {
    /// Scene item id of the group itself.
    pub id: i64,
    /// Group name.
    pub name: String,
    /// Always `"group"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the group is enabled in its scene.
    pub visible: bool,
    /// Direct members; empty when expansion failed.
    pub items: Vec<GroupItem>,
    /// Set when the member listing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An input that carries audio, with its current mixer state.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSource {
    /// Input UUID when OBS supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Input name.
    pub name: String,
    /// Input kind string.
    #[serde(rename = "type")]
    pub kind: String,
    /// Volume multiplier, 0.0 to 1.0 and beyond.
    pub volume: f64,
    /// Whether the input is muted.
    pub muted: bool,
    /// Always true; distinguishes mixer rows from scene items.
    pub is_audio: bool,
}

/// One entry in a scene's source listing.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum SourceEntry {
    /// A group with members expanded one level.
    Group(GroupSource),
    /// A plain visual item.
    Visual(VisualSource),
    /// An audio input appended after the visual items.
    Audio(AudioSource),
}

/// Full listing for one scene or group.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceListing {
    /// Visual items, expanded groups, then audio inputs.
    pub sources: Vec<SourceEntry>,
    /// The scene or group that was listed.
    pub scene_name: String,
    /// Whether the name resolved to a group rather than a scene.
    pub is_group: bool,
}

// ── scene grid ───────────────────────────────────────────────────────

/// Lists every scene with a jpeg thumbnail where OBS can render one.
///
/// Thumbnails are fetched concurrently; a failed screenshot leaves
/// that scene's `preview` empty and the rest of the grid intact.
pub async fn scenes_with_previews(gateway: &Gateway) -> Result<Vec<ScenePreview>, ControlError> {
    let list = gateway.call("GetSceneList", json!({})).await?;
    let names = scene_names(&list)?;

    let thumbnails = names.into_iter().map(|name| async move {
        let preview = match gateway
            .call(
                "GetSourceScreenshot",
                json!({
                    "sourceName": name,
                    "imageFormat": "jpeg",
                    "imageWidth": PREVIEW_WIDTH,
                    "imageHeight": PREVIEW_HEIGHT,
                    "imageCompressionQuality": PREVIEW_QUALITY,
                }),
            )
            .await
        {
            Ok(shot) => shot
                .get("imageData")
                .and_then(Value::as_str)
                .map(str::to_owned),
            Err(err) => {
                debug!(scene = %name, error = %err, "scene preview unavailable");
                None
            }
        };
        ScenePreview { name, preview }
    });
    Ok(futures::future::join_all(thumbnails).await)
}

/// Raw base64 screenshots for every scene, keyed by scene name.
///
/// Used by the snapshot endpoint; a failed screenshot maps to `null`.
pub async fn scene_previews(gateway: &Gateway) -> Result<Map<String, Value>, ControlError> {
    let list = gateway.call("GetSceneList", json!({})).await?;
    let mut previews = Map::new();
    for name in scene_names(&list)? {
        let entry = match gateway
            .call(
                "GetSourceScreenshot",
                json!({ "sourceName": name, "imageFormat": "png" }),
            )
            .await
        {
            Ok(shot) => shot
                .get("imageData")
                .and_then(Value::as_str)
                .map_or(Value::Null, |data| {
                    if data.starts_with("data:image") {
                        Value::String(data.to_owned())
                    } else {
                        Value::String(format!("data:image/png;base64,{data}"))
                    }
                }),
            Err(err) => {
                warn!(scene = %name, error = %err, "snapshot failed");
                Value::Null
            }
        };
        previews.insert(name, entry);
    }
    Ok(previews)
}

// ── source listing ───────────────────────────────────────────────────

/// Lists the sources of one scene or group.
///
/// Groups found in a scene are expanded exactly one level; audio
/// inputs are appended after the visual items. An unknown name is a
/// not-found error, everything narrower degrades in place.
pub async fn scene_sources(
    gateway: &Gateway,
    scene_name: &str,
) -> Result<SourceListing, ControlError> {
    let (scene_list, group_list, input_list) = tokio::try_join!(
        gateway.call("GetSceneList", json!({})),
        gateway.call("GetGroupList", json!({})),
        gateway.call("GetInputList", json!({})),
    )?;

    let groups: HashSet<String> = group_list
        .get("groups")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();
    let is_group = groups.contains(scene_name);
    if !is_group && !scene_names(&scene_list)?.iter().any(|name| name == scene_name) {
        return Err(ControlError::not_found(format!(
            "scene or group \"{scene_name}\" not found"
        )));
    }

    let request_type = if is_group {
        "GetGroupSceneItemList"
    } else {
        "GetSceneItemList"
    };
    let listed = gateway
        .call(request_type, json!({ "sceneName": scene_name }))
        .await?;
    let items = listed
        .get("sceneItems")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut sources = Vec::with_capacity(items.len());
    for item in &items {
        // Items that belong to a group are rendered under that group,
        // not at scene level.
        if item.get("parentGroupName").and_then(Value::as_str).is_some() {
            continue;
        }
        if is_group_item(item) {
            sources.push(SourceEntry::Group(expand_group(gateway, item).await));
        } else {
            sources.push(SourceEntry::Visual(
                visual_with_position(gateway, scene_name, item).await,
            ));
        }
    }

    let inputs = input_list
        .get("inputs")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    for audio in probe_audio_inputs(gateway, &inputs).await {
        sources.push(SourceEntry::Audio(audio));
    }

    Ok(SourceListing {
        sources,
        scene_name: scene_name.to_owned(),
        is_group,
    })
}

fn is_group_item(item: &Value) -> bool {
    item.get("isGroup").and_then(Value::as_bool) == Some(true)
        || item.get("sourceType").and_then(Value::as_str) == Some("OBS_SOURCE_TYPE_GROUP")
}

/// Lists a group's direct members; a failure yields the group shell
/// with an error marker instead of dropping it from the view.
async fn expand_group(gateway: &Gateway, item: &Value) -> GroupSource {
    let name = str_field(item, "sourceName");
    let mut group = GroupSource {
        id: item.get("sceneItemId").and_then(Value::as_i64).unwrap_or_default(),
        name: name.clone(),
        kind: "group".into(),
        visible: item
            .get("sceneItemEnabled")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        items: Vec::new(),
        error: None,
    };
    match gateway
        .call("GetGroupSceneItemList", json!({ "sceneName": name }))
        .await
    {
        Ok(listed) => {
            if let Some(members) = listed.get("sceneItems").and_then(Value::as_array) {
                group.items = members
                    .iter()
                    .map(|member| GroupItem {
                        id: member
                            .get("sceneItemId")
                            .and_then(Value::as_i64)
                            .unwrap_or_default(),
                        name: str_field(member, "sourceName"),
                        kind: str_field(member, "sourceType"),
                        visible: member
                            .get("sceneItemEnabled")
                            .and_then(Value::as_bool)
                            .unwrap_or(true),
                        is_group_item: true,
                        parent_group: group.name.clone(),
                    })
                    .collect();
            }
        }
        Err(err) => {
            warn!(group = %group.name, error = %err, "failed to expand group");
            group.error = Some("failed to load group contents".into());
        }
    }
    group
}

/// Builds a visual entry, falling back to position (0, 0) when the
/// transform lookup fails.
async fn visual_with_position(gateway: &Gateway, scene_name: &str, item: &Value) -> VisualSource {
    let id = item.get("sceneItemId").and_then(Value::as_i64).unwrap_or_default();
    let (x, y) = match gateway
        .call(
            "GetSceneItemTransform",
            json!({ "sceneName": scene_name, "sceneItemId": id }),
        )
        .await
    {
        Ok(resp) => {
            let transform = resp.get("sceneItemTransform");
            (
                transform
                    .and_then(|t| t.get("positionX"))
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
                transform
                    .and_then(|t| t.get("positionY"))
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
            )
        }
        Err(err) => {
            debug!(scene = scene_name, item = id, error = %err, "transform unavailable");
            (0.0, 0.0)
        }
    };
    VisualSource {
        id,
        name: str_field(item, "sourceName"),
        kind: str_field(item, "sourceType"),
        visible: item
            .get("sceneItemEnabled")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        x,
        y,
    }
}

// ── audio ────────────────────────────────────────────────────────────

/// Filters `inputs` down to those that answer the audio-track probe
/// and reads their mixer state. Probe failures silently skip the
/// input; a failed volume or mute read skips it with a warning.
async fn probe_audio_inputs(gateway: &Gateway, inputs: &[Value]) -> Vec<AudioSource> {
    let mut entries = Vec::new();
    for input in inputs {
        let name = str_field(input, "inputName");
        if name.is_empty() {
            continue;
        }
        if gateway
            .call("GetInputAudioTracks", json!({ "inputName": name }))
            .await
            .is_err()
        {
            // Not an audio-capable input.
            continue;
        }
        let state = tokio::try_join!(
            gateway.call("GetInputVolume", json!({ "inputName": name })),
            gateway.call("GetInputMute", json!({ "inputName": name })),
        );
        match state {
            Ok((volume, mute)) => entries.push(AudioSource {
                id: input
                    .get("inputUuid")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                name,
                kind: str_field(input, "inputKind"),
                volume: volume
                    .get("inputVolumeMul")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
                muted: mute
                    .get("inputMuted")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                is_audio: true,
            }),
            Err(err) => {
                warn!(input = %name, error = %err, "failed to read mixer state");
            }
        }
    }
    entries
}

/// Current monitor level per audio-capable input, keyed by input name.
///
/// Inputs that fail the probe or the level read are omitted.
pub async fn audio_levels(gateway: &Gateway) -> Result<Map<String, Value>, ControlError> {
    let input_list = gateway.call("GetInputList", json!({})).await?;
    let inputs = input_list
        .get("inputs")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut levels = Map::new();
    for input in &inputs {
        let name = str_field(input, "inputName");
        if name.is_empty() {
            continue;
        }
        if gateway
            .call("GetInputAudioTracks", json!({ "inputName": name }))
            .await
            .is_err()
        {
            continue;
        }
        let level = match gateway
            .call("GetInputAudioMonitor", json!({ "inputName": name }))
            .await
        {
            Ok(monitor) => monitor
                .get("inputLevels")
                .and_then(Value::as_array)
                .and_then(|channels| channels.first())
                .and_then(Value::as_array)
                .and_then(|samples| samples.first())
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            Err(_) => continue,
        };
        levels.insert(name, json!(level));
    }
    Ok(levels)
}

// ── layout export ────────────────────────────────────────────────────

/// Snapshot of every scene, its items, and their transforms.
///
/// Unlike the interactive views this propagates failures: a partial
/// export is worse than none.
pub async fn export_layout(gateway: &Gateway) -> Result<Value, ControlError> {
    let list = gateway.call("GetSceneList", json!({})).await?;
    let mut scenes = Vec::new();
    for name in scene_names(&list)? {
        let listed = gateway
            .call("GetSceneItemList", json!({ "sceneName": name }))
            .await?;
        let items = listed
            .get("sceneItems")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut exported_items = Vec::with_capacity(items.len());
        for item in items {
            let id = item.get("sceneItemId").and_then(Value::as_i64).unwrap_or_default();
            let transform = gateway
                .call(
                    "GetSceneItemTransform",
                    json!({ "sceneName": name, "sceneItemId": id }),
                )
                .await?;
            let mut entry = item;
            if let Some(map) = entry.as_object_mut() {
                map.insert(
                    "transform".into(),
                    transform
                        .get("sceneItemTransform")
                        .cloned()
                        .unwrap_or(Value::Null),
                );
            }
            exported_items.push(entry);
        }
        scenes.push(json!({ "sceneName": name, "items": exported_items }));
    }
    Ok(json!({
        "exportedAt": chrono::Utc::now().to_rfc3339(),
        "scenes": scenes,
    }))
}

// ── helpers ──────────────────────────────────────────────────────────

fn scene_names(scene_list: &Value) -> Result<Vec<String>, ControlError> {
    scene_list
        .get("scenes")
        .and_then(Value::as_array)
        .map(|scenes| {
            scenes
                .iter()
                .filter_map(|scene| scene.get("sceneName").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .ok_or_else(|| ControlError::protocol("GetSceneList returned no scene array"))
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}
