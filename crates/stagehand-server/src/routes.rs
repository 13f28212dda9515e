//! Route table and client-tracking middleware.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{audio, output, scenes, sources, system};
use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/obs-status", get(system::obs_status))
        .route(
            "/api/verify-connection",
            get(system::verify_connection).post(system::verify_custom_connection),
        )
        .route("/api/logs", get(system::logs))
        .route("/api/scenes", get(scenes::list_scenes))
        .route("/api/active-scene", get(scenes::active_scene))
        .route("/api/switch_scene", post(scenes::switch_scene))
        .route("/api/scene-previews", get(scenes::scene_previews))
        .route("/api/export-config", get(scenes::export_config))
        .route("/api/sources/{scene_name}", get(sources::list_sources))
        .route(
            "/api/source-preview/{source_name}",
            get(sources::source_preview),
        )
        .route("/api/toggle_source", post(sources::toggle_source))
        .route("/api/set_position", post(sources::set_position))
        .route("/api/move_source", post(sources::move_source))
        .route("/api/add_source", post(sources::add_source))
        .route("/api/delete_source", post(sources::delete_source))
        .route("/api/audio-levels", get(audio::audio_levels))
        .route("/api/toggle_mute", post(audio::toggle_mute))
        .route("/api/set_volume", post(audio::set_volume))
        .route("/api/streaming", post(output::streaming))
        .route("/api/recording", post(output::recording))
        .layer(middleware::from_fn_with_state(state.clone(), track_client))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Stamps the requesting client into the activity tracker.
///
/// Runs before every dashboard route so the idle logic sees precisely
/// the traffic that justifies keeping the OBS link alive. Requests
/// without peer info (tests, unix sockets) count as one "local" client.
async fn track_client(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if path == "/" || path.starts_with("/api/") {
        let client = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map_or_else(|| "local".to_owned(), |ConnectInfo(addr)| addr.ip().to_string());
        state.gateway.tracker().mark(&client);
    }
    next.run(request).await
}
