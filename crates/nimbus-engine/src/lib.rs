//! UI-context side of the Nimbus control plane.
//!
//! Everything that touches view state lives behind a single logical thread
//! of control (the "ui context"): the tab registry, the engine backend, and
//! the event pump. I/O tasks never reach in directly — they submit units of
//! work through [`UiExecutor`] and await the result or a timeout.

pub mod backend;
pub mod engine;
pub mod executor;
pub mod tabs;
pub mod wait;

#[cfg(test)]
pub(crate) mod testutil;

pub use backend::{EngineBackend, EngineEvent, ScriptResultSender};
pub use engine::Engine;
pub use executor::{ui_channel, UiExecutor, UiRunner};
pub use tabs::TabRegistry;
pub use wait::wait_for_load;
