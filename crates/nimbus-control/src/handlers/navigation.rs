//! Navigation handlers: navigate, history, reload, get_url.

use std::time::Instant;

use nimbus_common::ControlError;
use nimbus_engine::wait_for_load;
use serde_json::Value;
use tracing::info;

use crate::context::ServerContext;
use crate::envelope::Envelope;

/// History direction, validated by the router before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Back,
    Forward,
}

impl HistoryAction {
    /// Case-insensitive parse; anything but back/forward is a client error.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "back" => Some(Self::Back),
            "forward" => Some(Self::Forward),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Forward => "forward",
        }
    }
}

/// `POST /internal/navigate`. Navigates the target tab; against an empty
/// registry it creates the first tab instead. Navigation confirmation is
/// load-bearing: if the page is still loading when the bound elapses, the
/// whole operation fails and the client must retry.
pub async fn navigate(
    ctx: &ServerContext,
    url: String,
    tab_index: Option<usize>,
) -> Result<Value, ControlError> {
    info!(%url, "navigate");
    let start = Instant::now();

    let count = ctx.submit(|engine| engine.tab_count()).await?;
    let (target, created_tab) = if count == 0 {
        let u = url.clone();
        let index = ctx.submit(move |engine| engine.create_tab(&u)).await??;
        (index, true)
    } else {
        let target = ctx
            .submit(move |engine| engine.resolve_target(tab_index))
            .await??;
        let u = url.clone();
        ctx.submit(move |engine| engine.navigate(target, &u)).await??;
        (target, false)
    };

    let loaded = wait_for_load(
        &ctx.executor,
        ctx.marshal_timeout(),
        target,
        ctx.navigation_wait(),
    )
    .await?;
    let load_time_ms = start.elapsed().as_millis() as u64;

    if !loaded {
        return Ok(Envelope::error(ControlError::LoadTimeout)
            .field("tabIndex", target)
            .field("loadTimeMs", load_time_ms)
            .into_value());
    }

    let final_url = ctx
        .submit(move |engine| engine.current_url(target))
        .await??;
    Ok(Envelope::ok()
        .field("tabIndex", target)
        .field("finalUrl", if final_url.is_empty() { url } else { final_url })
        .field("createdTab", created_tab)
        .field("loadTimeMs", load_time_ms)
        .into_value())
}

/// `POST /internal/history`.
pub async fn history(
    ctx: &ServerContext,
    action: HistoryAction,
    tab_index: Option<usize>,
) -> Result<Value, ControlError> {
    let target = ctx
        .submit(move |engine| engine.resolve_target(tab_index))
        .await??;
    let start = Instant::now();

    match action {
        HistoryAction::Back => ctx.submit(move |engine| engine.history_back(target)).await??,
        HistoryAction::Forward => {
            ctx.submit(move |engine| engine.history_forward(target))
                .await??
        }
    }

    let loaded = wait_for_load(
        &ctx.executor,
        ctx.marshal_timeout(),
        target,
        ctx.navigation_wait(),
    )
    .await?;
    let load_time_ms = start.elapsed().as_millis() as u64;

    if !loaded {
        return Ok(Envelope::error(ControlError::LoadTimeout)
            .field("action", action.as_str())
            .field("tabIndex", target)
            .field("loadTimeMs", load_time_ms)
            .into_value());
    }

    let final_url = ctx
        .submit(move |engine| engine.current_url(target))
        .await??;
    Ok(Envelope::ok()
        .field("action", action.as_str())
        .field("tabIndex", target)
        .field("finalUrl", final_url)
        .field("loadTimeMs", load_time_ms)
        .into_value())
}

/// `POST /internal/reload`.
pub async fn reload(
    ctx: &ServerContext,
    tab_index: Option<usize>,
    ignore_cache: bool,
) -> Result<Value, ControlError> {
    let target = ctx
        .submit(move |engine| engine.resolve_target(tab_index))
        .await??;
    let start = Instant::now();

    ctx.submit(move |engine| engine.reload(target, ignore_cache))
        .await??;

    let loaded = wait_for_load(
        &ctx.executor,
        ctx.marshal_timeout(),
        target,
        ctx.navigation_wait(),
    )
    .await?;
    let load_time_ms = start.elapsed().as_millis() as u64;

    if !loaded {
        return Ok(Envelope::error(ControlError::LoadTimeout)
            .field("tabIndex", target)
            .field("ignoreCache", ignore_cache)
            .field("loadTimeMs", load_time_ms)
            .into_value());
    }

    Ok(Envelope::ok()
        .field("tabIndex", target)
        .field("ignoreCache", ignore_cache)
        .field("loadTimeMs", load_time_ms)
        .into_value())
}

/// `GET /internal/get_url`.
pub async fn get_url(ctx: &ServerContext, tab_index: Option<usize>) -> Result<Value, ControlError> {
    let target = ctx
        .submit(move |engine| engine.resolve_target(tab_index))
        .await??;
    let url = ctx
        .submit(move |engine| engine.current_url(target))
        .await??;
    Ok(Envelope::ok()
        .field("url", url)
        .field("tabIndex", target)
        .into_value())
}
