//! Request handlers, grouped the way the endpoint surface is: navigation,
//! tab management, and content operations. Each handler receives
//! already-validated, already-typed arguments from the router and returns
//! either an envelope value or a [`ControlError`] the router wraps.

pub mod content;
pub mod navigation;
pub mod tabs;

use serde_json::{json, Value};

use crate::context::ServerContext;

/// `GET /health`. Readiness reflects whether the ui context still accepts
/// marshaled work.
pub async fn health(ctx: &ServerContext) -> Value {
    json!({
        "success": true,
        "status": "ok",
        "ready": ctx.executor.is_live(),
    })
}
