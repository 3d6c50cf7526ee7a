//! The production engine backend, built on `wry` webviews.
//!
//! One child webview per tab, parented to the host window. Page-load and
//! title events are pushed into a shared queue that the engine pump drains;
//! script results come back through wry's evaluation callback wrapped in
//! the completion payload the control plane's parser expects.

mod backend;
mod script;

pub use backend::{FrameSlot, WryBackend};
pub use script::completion_wrapper;
