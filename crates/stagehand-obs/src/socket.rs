//! Live obs-websocket sessions over tokio-tungstenite.
//!
//! [`ObsDialer`] performs the TCP connect plus the `Hello`/`Identify`
//! handshake and hands back an [`ObsSession`]. A session owns two
//! tasks: a writer draining an mpsc queue into the sink, and a reader
//! routing responses to their callers through a pending-call map keyed
//! by request id. Multiple calls can be in flight on one stream.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::protocol::{self, Envelope, Hello, RequestStatus};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type PendingMap = Mutex<HashMap<String, oneshot::Sender<Result<Value, SocketError>>>>;

/// Where and how to reach an obs-websocket server.
#[derive(Clone, Debug)]
pub struct ObsTarget {
    /// Hostname or address of the OBS machine.
    pub host: String,
    /// obs-websocket listen port.
    pub port: u16,
    /// Password for the handshake; ignored when the server runs open.
    pub password: String,
}

impl ObsTarget {
    /// The `ws://` URL this target dials.
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

/// Failures at the socket layer.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// The TCP/WebSocket connect itself failed.
    #[error("failed to reach {url}: {message}")]
    Dial {
        /// URL that was dialled.
        url: String,
        /// Underlying transport failure.
        message: String,
    },

    /// The server refused our `Identify`.
    #[error("OBS rejected the authentication handshake")]
    Auth,

    /// The session closed before (or while) a call completed.
    #[error("session closed")]
    Closed,

    /// A frame arrived that does not fit the protocol.
    #[error("malformed frame: {0}")]
    Frame(String),

    /// OBS answered the request with a failure status.
    #[error("{request_type} failed with status {code}: {comment}")]
    Request {
        /// Request type that failed.
        request_type: String,
        /// Numeric obs-websocket status code.
        code: u16,
        /// Server-supplied detail, possibly empty.
        comment: String,
    },
}

// ── traits ───────────────────────────────────────────────────────────

/// Establishes sessions. The manager only ever talks to this trait, so
/// tests swap in [`crate::stub::StubDialer`].
#[async_trait]
pub trait ControlDialer: Send + Sync + 'static {
    /// Dials `target` and completes the handshake.
    async fn dial(&self, target: &ObsTarget) -> Result<Arc<dyn ControlSession>, SocketError>;
}

/// An identified session requests can be issued on.
#[async_trait]
pub trait ControlSession: Send + Sync {
    /// Sends one request and waits for its matching response.
    async fn call(&self, request_type: &str, params: Value) -> Result<Value, SocketError>;

    /// Tears the session down. Idempotent; in-flight calls resolve
    /// with [`SocketError::Closed`].
    async fn close(&self);
}

// ── dialer ───────────────────────────────────────────────────────────

/// The real dialer backing production wiring.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObsDialer;

#[async_trait]
impl ControlDialer for ObsDialer {
    async fn dial(&self, target: &ObsTarget) -> Result<Arc<dyn ControlSession>, SocketError> {
        let url = target.url();
        let (stream, _response) =
            connect_async(url.as_str())
                .await
                .map_err(|err| SocketError::Dial {
                    url: url.clone(),
                    message: err.to_string(),
                })?;
        let stream = handshake(stream, &target.password).await?;
        debug!(%url, "obs-websocket session identified");
        Ok(Arc::new(ObsSession::spawn(stream)))
    }
}

/// Runs the `Hello` → `Identify` → `Identified` exchange.
async fn handshake(mut stream: WsStream, password: &str) -> Result<WsStream, SocketError> {
    let hello = next_envelope(&mut stream).await?;
    if hello.op != protocol::op::HELLO {
        return Err(SocketError::Frame(format!(
            "expected Hello, got opcode {}",
            hello.op
        )));
    }
    let hello: Hello = serde_json::from_value(hello.d)
        .map_err(|err| SocketError::Frame(format!("bad Hello payload: {err}")))?;

    let token = hello
        .authentication
        .map(|auth| protocol::auth_token(password, &auth.salt, &auth.challenge));
    let identify = protocol::identify_frame(token.as_deref());
    stream
        .send(Message::text(identify.to_string()))
        .await
        .map_err(|_| SocketError::Closed)?;

    // A server that dislikes our credentials closes instead of
    // answering, which surfaces here as a closed stream.
    let reply = next_envelope(&mut stream).await.map_err(|err| match err {
        SocketError::Closed => SocketError::Auth,
        other => other,
    })?;
    if reply.op != protocol::op::IDENTIFIED {
        return Err(SocketError::Frame(format!(
            "expected Identified, got opcode {}",
            reply.op
        )));
    }
    Ok(stream)
}

/// Reads frames until a parseable envelope arrives.
async fn next_envelope(stream: &mut WsStream) -> Result<Envelope, SocketError> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                return serde_json::from_str(text.as_str())
                    .map_err(|err| SocketError::Frame(err.to_string()));
            }
            Some(Ok(Message::Close(_))) | None => return Err(SocketError::Closed),
            Some(Ok(_)) => {}
            Some(Err(err)) => return Err(SocketError::Frame(err.to_string())),
        }
    }
}

// ── session ──────────────────────────────────────────────────────────

/// One identified obs-websocket session.
pub struct ObsSession {
    outbound: mpsc::Sender<Message>,
    pending: Arc<PendingMap>,
    cancel: CancellationToken,
}

impl ObsSession {
    /// Splits the stream and spawns the reader and writer tasks.
    fn spawn(stream: WsStream) -> Self {
        let (sink, source) = stream.split();
        let (outbound, outbound_rx) = mpsc::channel::<Message>(64);
        let pending: Arc<PendingMap> = Arc::new(Mutex::new(HashMap::new()));
        let cancel = CancellationToken::new();

        tokio::spawn(write_loop(sink, outbound_rx, cancel.clone()));
        tokio::spawn(read_loop(source, Arc::clone(&pending), cancel.clone()));

        Self {
            outbound,
            pending,
            cancel,
        }
    }
}

#[async_trait]
impl ControlSession for ObsSession {
    async fn call(&self, request_type: &str, params: Value) -> Result<Value, SocketError> {
        if self.cancel.is_cancelled() {
            return Err(SocketError::Closed);
        }
        let request_id = Uuid::new_v4().to_string();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.lock().insert(request_id.clone(), reply_tx);

        let frame = protocol::request_frame(request_type, &request_id, &params);
        if self
            .outbound
            .send(Message::text(frame.to_string()))
            .await
            .is_err()
        {
            self.pending.lock().remove(&request_id);
            return Err(SocketError::Closed);
        }

        match reply_rx.await {
            Ok(result) => result,
            // Sender dropped without an answer, the reader is gone.
            Err(_) => Err(SocketError::Closed),
        }
    }

    async fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ObsSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Sends queued frames; emits a Close frame when cancelled.
async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut outbound: mpsc::Receiver<Message>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                if sink.send(frame).await.is_err() {
                    cancel.cancel();
                    break;
                }
            }
        }
    }
}

/// Routes responses to waiting callers; on stream end every pending
/// call resolves with [`SocketError::Closed`].
async fn read_loop(
    mut source: SplitStream<WsStream>,
    pending: Arc<PendingMap>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            frame = source.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => dispatch_frame(text.as_str(), &pending),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(error = %err, "obs-websocket stream error");
                        break;
                    }
                }
            }
        }
    }
    cancel.cancel();
    let drained: Vec<_> = pending.lock().drain().collect();
    for (_, caller) in drained {
        let _ = caller.send(Err(SocketError::Closed));
    }
}

/// Matches one response frame against the pending-call map.
fn dispatch_frame(text: &str, pending: &PendingMap) {
    let Ok(envelope) = serde_json::from_str::<Envelope>(text) else {
        warn!("dropping unparseable obs-websocket frame");
        return;
    };
    if envelope.op != protocol::op::REQUEST_RESPONSE {
        return;
    }

    let Some(request_id) = envelope
        .d
        .get("requestId")
        .and_then(Value::as_str)
        .map(str::to_owned)
    else {
        warn!("response frame without requestId");
        return;
    };
    let Some(caller) = pending.lock().remove(&request_id) else {
        debug!(%request_id, "response for unknown request id");
        return;
    };

    let request_type = envelope
        .d
        .get("requestType")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    let result = match envelope
        .d
        .get("requestStatus")
        .cloned()
        .map(serde_json::from_value::<RequestStatus>)
    {
        Some(Ok(status)) if status.result => Ok(envelope
            .d
            .get("responseData")
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))),
        Some(Ok(status)) => Err(SocketError::Request {
            request_type,
            code: status.code,
            comment: status.comment.unwrap_or_default(),
        }),
        _ => Err(SocketError::Frame("response without requestStatus".into())),
    };
    let _ = caller.send(result);
}
