//! The Nimbus control plane.
//!
//! A local, unix-socket HTTP server that exposes the embedded browser to
//! automation clients: navigation, tab management, script execution, HTML
//! retrieval, and screenshots. Every request is parsed and validated on an
//! I/O task, crosses into the ui context through the thread marshaler, and
//! comes back wrapped in a uniform `{success, ...}` JSON envelope.

pub mod capture;
pub mod context;
pub mod envelope;
pub mod handlers;
pub mod http;
pub mod js_result;
pub mod router;
pub mod server;

pub use context::ServerContext;
pub use server::ControlServer;
