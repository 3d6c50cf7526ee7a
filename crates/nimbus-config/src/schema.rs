//! Config schema with serde defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Control-plane configuration. Every field has a default so an empty or
/// partial TOML file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Filesystem path of the unix control socket.
    pub socket_path: PathBuf,

    /// Request body cap, enforced at the framing layer before JSON parsing.
    pub max_request_bytes: usize,

    /// Hard bound for navigation-class load waits.
    pub navigation_wait_ms: u64,

    /// Soft bound for content-class load waits (script execution,
    /// screenshots).
    pub content_wait_ms: u64,

    /// How long an I/O task waits for a marshaled unit of work before
    /// giving up on the ui thread.
    pub marshal_timeout_ms: u64,

    /// How long to wait for the engine to deliver a script result.
    pub script_timeout_ms: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            max_request_bytes: 1024 * 1024,
            navigation_wait_ms: 15_000,
            content_wait_ms: 2_000,
            marshal_timeout_ms: 5_000,
            script_timeout_ms: 5_000,
        }
    }
}

/// Per-user default socket path, so concurrent instances run by different
/// users never collide. Prefers the runtime dir when the platform has one.
pub fn default_socket_path() -> PathBuf {
    if let Some(runtime) = dirs::runtime_dir() {
        return runtime.join("nimbus").join("control.sock");
    }
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".into());
    std::env::temp_dir().join(format!("nimbus-control-{user}.sock"))
}
