//! Core error model shared by the client, config and tool layers.

pub mod error;

pub use error::{ConfigError, GhostError};
