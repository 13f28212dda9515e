//! Streaming and recording control.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Body for `POST /api/streaming` and `POST /api/recording`.
#[derive(Deserialize)]
pub struct OutputRequest {
    action: Option<String>,
}

/// POST /api/streaming
pub async fn streaming(
    State(state): State<AppState>,
    Json(body): Json<OutputRequest>,
) -> Result<Json<Value>, ApiError> {
    toggle_output(&state, body.action.as_deref(), Output::Stream).await
}

/// POST /api/recording
pub async fn recording(
    State(state): State<AppState>,
    Json(body): Json<OutputRequest>,
) -> Result<Json<Value>, ApiError> {
    toggle_output(&state, body.action.as_deref(), Output::Record).await
}

#[derive(Clone, Copy)]
enum Output {
    Stream,
    Record,
}

impl Output {
    fn request_type(self, start: bool) -> &'static str {
        match (self, start) {
            (Self::Stream, true) => "StartStream",
            (Self::Stream, false) => "StopStream",
            (Self::Record, true) => "StartRecord",
            (Self::Record, false) => "StopRecord",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Stream => "Streaming",
            Self::Record => "Recording",
        }
    }
}

async fn toggle_output(
    state: &AppState,
    action: Option<&str>,
    output: Output,
) -> Result<Json<Value>, ApiError> {
    let start = match action {
        Some("start") => true,
        Some("stop") => false,
        _ => {
            return Err(ApiError::validation(
                "action must be \"start\" or \"stop\"",
            ));
        }
    };
    state
        .gateway
        .call(output.request_type(start), json!({}))
        .await?;

    let verb = if start { "started" } else { "stopped" };
    info!("{} {verb}", output.label());
    if let Some(notifier) = &state.notifier {
        notifier.notify(&format!("{} {verb}", output.label()));
    }
    Ok(Json(json!({ "success": true, "action": if start { "start" } else { "stop" } })))
}
