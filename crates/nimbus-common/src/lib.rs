//! Shared types and errors for the Nimbus browser shell.

pub mod errors;
pub mod types;

pub use errors::{ConfigError, ControlError, EngineError};
pub use types::{Frame, LoadState, TabInfo, ViewId};
