//! Axum HTTP surface for Stagehand.
//!
//! Thin handlers over [`stagehand_obs`]: each endpoint validates its
//! input, issues gateway calls or catalog aggregations, and maps
//! [`stagehand_core::errors::ControlError`] onto HTTP statuses. The
//! client-tracking middleware stamps every dashboard request into the
//! activity tracker before the handler runs.

pub mod error;
pub mod handlers;
pub mod notify;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
