//! Content handlers: script execution, HTML extraction, screenshots.
//!
//! These share the soft content-wait policy: a page still loading after the
//! bound does not fail the call, but get_html is the exception — partial
//! documents are worse than an explicit failure.

use nimbus_common::ControlError;
use nimbus_engine::wait_for_load;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::capture::encode_base64_png;
use crate::context::ServerContext;
use crate::envelope::Envelope;
use crate::js_result::{self, JsExecutionResult};

const OUTER_HTML_SNIPPET: &str = "document.documentElement.outerHTML";

/// Run `code` on the target tab and decode the completion payload. The
/// marshaled call only starts the script; completion arrives on a oneshot
/// that we await off the ui context with its own bound.
async fn run_script(
    ctx: &ServerContext,
    target: usize,
    code: String,
) -> Result<JsExecutionResult, ControlError> {
    let (tx, rx) = oneshot::channel();
    ctx.submit(move |engine| engine.execute_script(target, &code, tx))
        .await??;

    let raw = match tokio::time::timeout(ctx.script_timeout(), rx).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(_)) => return Err(ControlError::ShuttingDown),
        Err(_) => {
            return Err(ControlError::Execution(
                "script did not complete in time".into(),
            ))
        }
    };
    js_result::parse(&raw)
}

/// `POST /internal/execute_js`.
pub async fn execute_js(
    ctx: &ServerContext,
    code: String,
    tab_index: Option<usize>,
) -> Result<Value, ControlError> {
    let target = ctx
        .submit(move |engine| engine.resolve_target(tab_index))
        .await??;

    let ready = wait_for_load(
        &ctx.executor,
        ctx.marshal_timeout(),
        target,
        ctx.content_wait(),
    )
    .await?;
    if !ready {
        debug!(target, "content wait expired; executing against a loading page");
    }

    let exec = run_script(ctx, target, code).await?;
    if !exec.success {
        let message = exec
            .error_message
            .unwrap_or_else(|| "script execution failed".into());
        let mut envelope = Envelope::error(ControlError::Execution(message))
            .field("tabIndex", target)
            .field("loadWaitTimedOut", !ready);
        if let Some(stack) = exec.error_stack {
            envelope = envelope.field("stack", stack);
        }
        return Ok(envelope.into_value());
    }

    let mut envelope = Envelope::ok()
        .field("type", exec.kind.as_str())
        .field("result", exec.value)
        .field("tabIndex", target)
        .field("loadWaitTimedOut", !ready);
    if let Some(string_value) = exec.string_value {
        envelope = envelope.field("stringResult", string_value);
    }
    Ok(envelope.into_value())
}

/// `GET|POST /internal/get_html`. Hard content wait: a page that has not
/// settled fails rather than returning a half-built document.
pub async fn get_html(ctx: &ServerContext, tab_index: Option<usize>) -> Result<Value, ControlError> {
    let target = ctx
        .submit(move |engine| engine.resolve_target(tab_index))
        .await??;

    let ready = wait_for_load(
        &ctx.executor,
        ctx.marshal_timeout(),
        target,
        ctx.content_wait(),
    )
    .await?;
    if !ready {
        return Ok(Envelope::error(ControlError::LoadTimeout)
            .field("tabIndex", target)
            .into_value());
    }

    let exec = run_script(ctx, target, OUTER_HTML_SNIPPET.to_string()).await?;
    if !exec.success {
        let message = exec
            .error_message
            .unwrap_or_else(|| "could not read document".into());
        return Ok(Envelope::error(ControlError::Execution(message))
            .field("tabIndex", target)
            .into_value());
    }

    let html = exec
        .value
        .as_str()
        .map(String::from)
        .or(exec.string_value)
        .unwrap_or_default();
    if html.is_empty() {
        return Ok(Envelope::error("document has no HTML content")
            .field("tabIndex", target)
            .into_value());
    }

    Ok(Envelope::ok()
        .field("html", html)
        .field("tabIndex", target)
        .into_value())
}

/// `GET|POST /internal/screenshot`. Viewport capture only; a fullPage
/// request downgrades to the viewport with a warning rather than failing.
pub async fn screenshot(
    ctx: &ServerContext,
    tab_index: Option<usize>,
    full_page: bool,
) -> Result<Value, ControlError> {
    let target = ctx
        .submit(move |engine| engine.resolve_target(tab_index))
        .await??;

    let ready = wait_for_load(
        &ctx.executor,
        ctx.marshal_timeout(),
        target,
        ctx.content_wait(),
    )
    .await?;

    if full_page {
        warn!(target, "full-page capture requested; falling back to viewport");
    }

    let frame = ctx.submit(move |engine| engine.capture(target)).await??;
    let encoded = encode_base64_png(&frame)?;

    let mut envelope = Envelope::ok()
        .field("screenshot", encoded)
        .field("tabIndex", target)
        .field("loadWaitTimedOut", !ready);
    if full_page {
        envelope = envelope.field(
            "warning",
            "full-page capture is not supported; captured the viewport",
        );
    }
    Ok(envelope.into_value())
}
