//! Single entry point for issuing obs-websocket requests.
//!
//! Every call flows through [`Gateway::call`]: connect on demand, send
//! the request, translate failures into [`ControlError`], and always
//! finish with the idle check so an abandoned dashboard releases the
//! OBS link no matter how its last request ended.

use std::sync::Arc;

use serde_json::Value;
use stagehand_core::errors::ControlError;
use tracing::debug;

use crate::activity::ClientTracker;
use crate::manager::ConnectionManager;
use crate::protocol::STATUS_RESOURCE_NOT_FOUND;
use crate::socket::SocketError;

/// Request-call front door shared by all HTTP handlers.
pub struct Gateway {
    manager: Arc<ConnectionManager>,
    tracker: Arc<ClientTracker>,
}

impl Gateway {
    /// Couples a connection manager with the client activity tracker.
    pub fn new(manager: Arc<ConnectionManager>, tracker: Arc<ClientTracker>) -> Self {
        Self { manager, tracker }
    }

    /// The underlying connection manager.
    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// The client activity tracker.
    pub fn tracker(&self) -> &Arc<ClientTracker> {
        &self.tracker
    }

    /// Issues one request against OBS.
    ///
    /// On any failure the session is dropped so the next call starts
    /// from a fresh dial. The idle check runs on success and failure
    /// alike, after the response is already decided.
    pub async fn call(&self, request_type: &str, params: Value) -> Result<Value, ControlError> {
        let outcome = self.dispatch(request_type, params).await;
        self.manager.disconnect_if_idle(&self.tracker).await;
        outcome
    }

    async fn dispatch(&self, request_type: &str, params: Value) -> Result<Value, ControlError> {
        let Some(session) = self.manager.ensure_connected().await else {
            return Err(ControlError::unavailable("OBS not available"));
        };
        debug!(request_type, "dispatching OBS request");
        match session.call(request_type, params).await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.manager.mark_failed().await;
                Err(normalize(request_type, &err))
            }
        }
    }
}

/// Maps a socket failure onto the error taxonomy handlers consume.
fn normalize(request_type: &str, err: &SocketError) -> ControlError {
    match err {
        SocketError::Request {
            code: STATUS_RESOURCE_NOT_FOUND,
            comment,
            ..
        } => {
            if comment.is_empty() {
                ControlError::not_found(format!("{request_type}: resource not found"))
            } else {
                ControlError::not_found(comment)
            }
        }
        SocketError::Request { code, comment, .. } => ControlError::Protocol {
            message: format!("{request_type} failed: {comment}"),
            code: Some(*code),
        },
        other => ControlError::Protocol {
            message: other.to_string(),
            code: None,
        },
    }
}
