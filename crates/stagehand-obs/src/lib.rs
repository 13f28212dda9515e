//! obs-websocket client plumbing for Stagehand.
//!
//! The layering runs bottom-up:
//!
//! - [`protocol`] holds the wire-level opcodes, frame builders, and the
//!   challenge/salt authentication digest.
//! - [`socket`] owns a live session: the handshake, the reader/writer
//!   tasks, and request-id multiplexing over one stream.
//! - [`manager`] decides *when* a session exists: lazy connect, idle
//!   teardown, and failure-driven teardown.
//! - [`gateway`] is the single entry point callers use to issue
//!   requests; every call passes through its idle check on the way out.
//! - [`catalog`] composes gateway calls into the aggregate views the
//!   dashboard renders (scenes, sources, audio, layout export).
//!
//! [`stub`] ships scripted in-memory implementations of the dialer and
//! session traits so the upper layers can be exercised without OBS.

pub mod activity;
pub mod catalog;
pub mod gateway;
pub mod manager;
pub mod protocol;
pub mod socket;
pub mod stub;

pub use activity::ClientTracker;
pub use gateway::Gateway;
pub use manager::{ConnectPolicy, ConnectionManager};
pub use socket::{ControlDialer, ControlSession, ObsDialer, ObsTarget, SocketError};
