//! # stagehand-core
//!
//! Foundation types for the Stagehand OBS remote-control gateway:
//!
//! - [`errors::ControlError`]: the error taxonomy every layer above the raw
//!   socket speaks (unavailable / protocol / not-found / validation)
//! - [`constants`]: shared wire-format and screenshot defaults

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;

pub use errors::ControlError;
