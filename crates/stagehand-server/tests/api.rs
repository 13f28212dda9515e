//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use stagehand_obs::activity::ClientTracker;
use stagehand_obs::gateway::Gateway;
use stagehand_obs::manager::{ConnectPolicy, ConnectionManager};
use stagehand_obs::socket::{ControlDialer, ControlSession, ObsTarget, SocketError};
use stagehand_obs::stub::{ScriptedSession, StubDialer};
use stagehand_server::{AppState, router};
use tower::ServiceExt;

fn target() -> ObsTarget {
    ObsTarget {
        host: "localhost".into(),
        port: 4455,
        password: "test123".into(),
    }
}

fn state_with_dialer(dialer: Arc<dyn ControlDialer>) -> AppState {
    let manager = Arc::new(ConnectionManager::new(
        dialer,
        target(),
        ConnectPolicy::default(),
    ));
    let tracker = Arc::new(ClientTracker::new(Duration::from_secs(30)));
    AppState {
        gateway: Arc::new(Gateway::new(manager, tracker)),
        verify_dialer: Arc::new(StubDialer::failing("probe refused")),
        default_target: target(),
        notifier: None,
        start_time: Instant::now(),
        log_path: None,
    }
}

/// Builds a state whose dialer mints a fresh scripted session per
/// dial, the way a reconnect against real OBS would.
fn state_with_script(
    script: impl Fn(&str, &Value) -> Result<Value, SocketError> + Send + Sync + 'static,
) -> AppState {
    let script = Arc::new(script);
    state_with_dialer(Arc::new(StubDialer::from_factory(move || {
        let script = Arc::clone(&script);
        Ok(
            Arc::new(ScriptedSession::new(move |request_type, params| {
                script(request_type, params)
            })) as Arc<dyn ControlSession>,
        )
    })))
}

fn app(state: AppState) -> Router {
    router(state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1_000_000)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1_000_000)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_reports_link_state() {
    let state = state_with_script(|_, _| Ok(json!({})));
    let (status, body) = get(app(state), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["obsConnected"], false);
    assert!(body["uptimeSecs"].is_number());
}

#[tokio::test]
async fn requests_mark_the_client_active() {
    let state = state_with_script(|_, _| Ok(json!({})));
    let tracker = Arc::clone(state.gateway.tracker());
    assert!(tracker.is_empty());
    get(app(state), "/api/obs-status").await;
    assert_eq!(tracker.len(), 1);
}

#[tokio::test]
async fn obs_status_is_200_even_when_obs_is_down() {
    let state = state_with_dialer(Arc::new(StubDialer::failing("connection refused")));
    let (status, body) = get(app(state), "/api/obs-status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn obs_status_reports_streaming_state() {
    let state = state_with_script(|request_type, _| {
        assert_eq!(request_type, "GetStreamStatus");
        Ok(json!({ "outputActive": true, "outputTimecode": "00:10:00" }))
    });
    let (status, body) = get(app(state), "/api/obs-status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], true);
    assert_eq!(body["streaming"], true);
}

#[tokio::test]
async fn unreachable_obs_maps_to_503() {
    let state = state_with_dialer(Arc::new(StubDialer::failing("connection refused")));
    let (status, body) = get(app(state), "/api/scenes").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "OBS_UNAVAILABLE");
}

#[tokio::test]
async fn scenes_carry_previews() {
    let state = state_with_script(|request_type, _| match request_type {
        "GetSceneList" => Ok(json!({ "scenes": [{ "sceneName": "Main" }] })),
        "GetSourceScreenshot" => Ok(json!({ "imageData": "data:image/jpeg;base64,AAAA" })),
        other => panic!("unexpected request {other}"),
    });
    let (status, body) = get(app(state), "/api/scenes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scenes"][0]["name"], "Main");
    assert!(body["scenes"][0]["preview"].is_string());
}

#[tokio::test]
async fn switch_scene_requires_a_name() {
    let state = state_with_script(|_, _| Ok(json!({})));
    let (status, body) = post(app(state), "/api/switch_scene", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PARAMS");
}

#[tokio::test]
async fn switch_scene_unknown_name_is_404() {
    let state = state_with_script(|request_type, _| {
        Err(SocketError::Request {
            request_type: request_type.into(),
            code: 600,
            comment: "No scene was found by the name".into(),
        })
    });
    let (status, body) =
        post(app(state), "/api/switch_scene", json!({ "sceneName": "Nope" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn switch_scene_succeeds() {
    let state = state_with_script(|request_type, params| {
        assert_eq!(request_type, "SetCurrentProgramScene");
        assert_eq!(params["sceneName"], "Main");
        Ok(json!({}))
    });
    let (status, body) =
        post(app(state), "/api/switch_scene", json!({ "sceneName": "Main" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["activeScene"], "Main");
}

#[tokio::test]
async fn source_listing_returns_nested_groups() {
    let state = state_with_script(|request_type, _| match request_type {
        "GetSceneList" => Ok(json!({ "scenes": [{ "sceneName": "Main" }] })),
        "GetGroupList" => Ok(json!({ "groups": ["Overlays"] })),
        "GetInputList" => Ok(json!({ "inputs": [] })),
        "GetSceneItemList" => Ok(json!({ "sceneItems": [
            { "sceneItemId": 2, "sourceName": "Overlays", "isGroup": true },
        ]})),
        "GetGroupSceneItemList" => Ok(json!({ "sceneItems": [
            { "sceneItemId": 10, "sourceName": "Logo",
              "sourceType": "OBS_SOURCE_TYPE_INPUT", "sceneItemEnabled": true },
        ]})),
        other => panic!("unexpected request {other}"),
    });
    let (status, body) = get(app(state), "/api/sources/Main").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sceneName"], "Main");
    assert_eq!(body["isGroup"], false);
    assert_eq!(body["sources"][0]["type"], "group");
    assert_eq!(body["sources"][0]["items"][0]["name"], "Logo");
    assert_eq!(body["sources"][0]["items"][0]["isGroupItem"], true);
}

#[tokio::test]
async fn unknown_scene_listing_is_404() {
    let state = state_with_script(|request_type, _| match request_type {
        "GetSceneList" => Ok(json!({ "scenes": [{ "sceneName": "Main" }] })),
        "GetGroupList" => Ok(json!({ "groups": [] })),
        "GetInputList" => Ok(json!({ "inputs": [] })),
        other => panic!("unexpected request {other}"),
    });
    let (status, _) = get(app(state), "/api/sources/Missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn toggle_source_validates_fields() {
    let state = state_with_script(|_, _| Ok(json!({})));
    let (status, _) = post(
        app(state),
        "/api/toggle_source",
        json!({ "sceneName": "Main" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn add_source_creates_a_new_input() {
    let state = state_with_script(|request_type, params| {
        assert_eq!(request_type, "CreateInput");
        assert_eq!(params["sceneName"], "Main");
        assert_eq!(params["inputName"], "Chat");
        assert_eq!(params["inputKind"], "browser_source");
        assert_eq!(params["inputSettings"]["url"], "https://example.com/chat");
        assert_eq!(params["sceneItemEnabled"], true);
        Ok(json!({ "sceneItemId": 7 }))
    });
    let (status, body) = post(
        app(state),
        "/api/add_source",
        json!({
            "sceneName": "Main",
            "sourceName": "Chat",
            "inputKind": "browser_source",
            "inputSettings": { "url": "https://example.com/chat" },
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["sceneItemId"], 7);
}

#[tokio::test]
async fn add_source_requires_an_input_kind() {
    let state = state_with_script(|_, _| Ok(json!({})));
    let (status, body) = post(
        app(state),
        "/api/add_source",
        json!({ "sceneName": "Main", "sourceName": "Chat" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PARAMS");
}

#[tokio::test]
async fn move_source_repositions_the_item() {
    let state = state_with_script(|request_type, params| {
        assert_eq!(request_type, "SetSceneItemTransform");
        assert_eq!(params["sceneName"], "Main");
        assert_eq!(params["sceneItemId"], 4);
        assert_eq!(params["sceneItemTransform"]["positionX"], 120.0);
        assert_eq!(params["sceneItemTransform"]["positionY"], 80.0);
        Ok(json!({}))
    });
    let (status, body) = post(
        app(state),
        "/api/move_source",
        json!({ "sceneName": "Main", "sourceId": 4, "x": 120.0, "y": 80.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["moved"]["sourceId"], 4);
    assert_eq!(body["moved"]["x"], 120.0);
}

#[tokio::test]
async fn move_source_validates_fields() {
    let state = state_with_script(|_, _| Ok(json!({})));
    let (status, _) = post(
        app(state),
        "/api/move_source",
        json!({ "sceneName": "Main", "sourceId": 4 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn audio_levels_degrade_to_empty_map() {
    let state = state_with_dialer(Arc::new(StubDialer::failing("connection refused")));
    let (status, body) = get(app(state), "/api/audio-levels").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn set_volume_rejects_out_of_range() {
    let state = state_with_script(|_, _| Ok(json!({})));
    let (status, _) = post(
        app(state),
        "/api/set_volume",
        json!({ "inputName": "Mic", "volume": 1.5 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn toggle_mute_sets_explicit_state() {
    let state = state_with_script(|request_type, params| {
        assert_eq!(request_type, "SetInputMute");
        assert_eq!(params["inputName"], "Mic");
        assert_eq!(params["inputMuted"], true);
        Ok(json!({}))
    });
    let (status, body) = post(
        app(state),
        "/api/toggle_mute",
        json!({ "sourceName": "Mic", "muted": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["muted"], true);
}

#[tokio::test]
async fn toggle_mute_requires_the_desired_state() {
    let state = state_with_script(|_, _| Ok(json!({})));
    let (status, body) = post(
        app(state),
        "/api/toggle_mute",
        json!({ "sourceName": "Mic" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PARAMS");
}

#[tokio::test]
async fn streaming_rejects_unknown_actions() {
    let state = state_with_script(|_, _| Ok(json!({})));
    let (status, body) = post(
        app(state),
        "/api/streaming",
        json!({ "action": "pause" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PARAMS");
}

#[tokio::test]
async fn streaming_start_issues_the_start_request() {
    let state = state_with_script(|request_type, _| {
        assert_eq!(request_type, "StartStream");
        Ok(json!({}))
    });
    let (status, body) = post(
        app(state),
        "/api/streaming",
        json!({ "action": "start" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["action"], "start");
}

#[tokio::test]
async fn recording_stop_issues_the_stop_request() {
    let state = state_with_script(|request_type, _| {
        assert_eq!(request_type, "StopRecord");
        Ok(json!({}))
    });
    let (status, body) = post(
        app(state),
        "/api/recording",
        json!({ "action": "stop" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn verify_probe_failure_is_200_with_success_false() {
    let state = state_with_script(|_, _| Ok(json!({})));
    let (status, body) = post(
        app(state),
        "/api/verify-connection",
        json!({ "host": "nowhere", "port": 4455 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn verify_probe_success_never_touches_the_shared_link() {
    let probe_session = Arc::new(ScriptedSession::ok());
    let mut state = state_with_script(|_, _| Ok(json!({})));
    state.verify_dialer = Arc::new(StubDialer::with_session(
        Arc::clone(&probe_session) as Arc<dyn ControlSession>
    ));
    let gateway = Arc::clone(&state.gateway);

    let (status, body) = post(app(state), "/api/verify-connection", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    // Probe session is closed immediately and the gateway never dialed.
    assert!(probe_session.is_closed());
    assert!(!gateway.manager().is_connected().await);
}

#[tokio::test]
async fn logs_without_a_file_is_200_with_placeholder() {
    let state = state_with_script(|_, _| Ok(json!({})));
    let (status, body) = get(app(state), "/api/logs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs"], "No logs found or error reading log file.");
}

#[tokio::test]
async fn logs_serve_the_mirror_file() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("stagehand.log");
    std::fs::write(&path, "line one\nline two\n").unwrap();

    let mut state = state_with_script(|_, _| Ok(json!({})));
    state.log_path = Some(path);
    let (status, body) = get(app(state), "/api/logs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs"], "line one\nline two\n");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let state = state_with_script(|_, _| Ok(json!({})));
    let (status, _) = get(app(state), "/api/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
