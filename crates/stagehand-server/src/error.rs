//! Error-to-status mapping for the HTTP surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stagehand_core::errors::ControlError;

/// Wrapper that turns a [`ControlError`] into a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub ControlError);

impl ApiError {
    /// A 400 for a malformed or incomplete request body.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(ControlError::validation(message))
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ControlError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ControlError::Protocol { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ControlError::NotFound { .. } => StatusCode::NOT_FOUND,
            ControlError::Validation { .. } => StatusCode::BAD_REQUEST,
        };
        let body = json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ControlError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn unavailable_maps_to_503() {
        assert_eq!(
            status_of(ControlError::unavailable("OBS not available")),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn protocol_maps_to_500() {
        assert_eq!(
            status_of(ControlError::protocol("bad frame")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            status_of(ControlError::not_found("no such scene")),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            status_of(ControlError::validation("sceneName is required")),
            StatusCode::BAD_REQUEST
        );
    }
}
