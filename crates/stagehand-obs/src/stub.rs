//! Scripted in-memory dialer and session for tests.
//!
//! Mirrors the shape of the real socket layer closely enough that the
//! manager, gateway, and catalog can be driven without an OBS instance.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::socket::{ControlDialer, ControlSession, ObsTarget, SocketError};

type Script = dyn Fn(&str, &Value) -> Result<Value, SocketError> + Send + Sync;
type SessionFactory = dyn Fn() -> Result<Arc<dyn ControlSession>, SocketError> + Send + Sync;

/// A session whose responses come from a closure.
pub struct ScriptedSession {
    script: Box<Script>,
    calls: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl ScriptedSession {
    /// Answers every call by consulting `script` with the request type
    /// and parameters.
    pub fn new(
        script: impl Fn(&str, &Value) -> Result<Value, SocketError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Answers every call with an empty object.
    pub fn ok() -> Self {
        Self::new(|_, _| Ok(json!({})))
    }

    /// Request types seen so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// How many times `request_type` has been issued.
    pub fn call_count(&self, request_type: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|seen| *seen == request_type)
            .count()
    }

    /// Whether [`ControlSession::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ControlSession for ScriptedSession {
    async fn call(&self, request_type: &str, params: Value) -> Result<Value, SocketError> {
        if self.is_closed() {
            return Err(SocketError::Closed);
        }
        self.calls.lock().push(request_type.to_owned());
        (self.script)(request_type, &params)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A dialer that manufactures sessions from a closure, optionally
/// after a delay, and counts how often it was asked to dial.
pub struct StubDialer {
    factory: Box<SessionFactory>,
    delay: Option<Duration>,
    dials: AtomicUsize,
}

impl StubDialer {
    /// Every dial yields a clone of `session`.
    pub fn with_session(session: Arc<dyn ControlSession>) -> Self {
        Self::from_factory(move || Ok(Arc::clone(&session)))
    }

    /// Every dial consults `factory` for its outcome.
    pub fn from_factory(
        factory: impl Fn() -> Result<Arc<dyn ControlSession>, SocketError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            delay: None,
            dials: AtomicUsize::new(0),
        }
    }

    /// Every dial fails with a transport error.
    pub fn failing(message: &str) -> Self {
        let message = message.to_owned();
        Self::from_factory(move || {
            Err(SocketError::Dial {
                url: "ws://stub:0".into(),
                message: message.clone(),
            })
        })
    }

    /// Makes each dial take `delay` before resolving.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of dial attempts observed.
    pub fn dial_count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ControlDialer for StubDialer {
    async fn dial(&self, _target: &ObsTarget) -> Result<Arc<dyn ControlSession>, SocketError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.factory)()
    }
}
