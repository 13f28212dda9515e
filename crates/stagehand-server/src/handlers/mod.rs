//! Request handlers, grouped by dashboard concern.

pub mod audio;
pub mod output;
pub mod scenes;
pub mod sources;
pub mod system;
