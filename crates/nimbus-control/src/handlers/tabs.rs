//! Tab management handlers: create, close, switch, info.

use std::time::Instant;

use nimbus_common::ControlError;
use nimbus_engine::wait_for_load;
use serde_json::Value;
use tracing::info;

use crate::context::ServerContext;
use crate::envelope::Envelope;

/// `POST /internal/tab_create`. Creation waits out the initial load with
/// the navigation bound; a page that never settles fails the call even
/// though the tab itself now exists.
pub async fn tab_create(ctx: &ServerContext, url: String) -> Result<Value, ControlError> {
    info!(%url, "create tab");
    let start = Instant::now();

    let u = url.clone();
    let index = ctx.submit(move |engine| engine.create_tab(&u)).await??;

    let loaded = wait_for_load(
        &ctx.executor,
        ctx.marshal_timeout(),
        index,
        ctx.navigation_wait(),
    )
    .await?;
    let load_time_ms = start.elapsed().as_millis() as u64;

    if !loaded {
        return Ok(Envelope::error(ControlError::LoadTimeout)
            .field("tabIndex", index)
            .field("loadTimeMs", load_time_ms)
            .into_value());
    }

    let final_url = ctx.submit(move |engine| engine.current_url(index)).await??;
    Ok(Envelope::ok()
        .field("tabIndex", index)
        .field("url", url)
        .field("finalUrl", final_url)
        .field("loadTimeMs", load_time_ms)
        .into_value())
}

/// `POST /internal/tab_close`. Indices above the closed tab renumber down.
pub async fn tab_close(ctx: &ServerContext, index: usize) -> Result<Value, ControlError> {
    ctx.submit(move |engine| engine.close_tab(index)).await??;
    info!(index, "tab closed");
    Ok(Envelope::ok().field("tabIndex", index).into_value())
}

/// `POST /internal/tab_switch`.
pub async fn tab_switch(ctx: &ServerContext, index: usize) -> Result<Value, ControlError> {
    let active = ctx.submit(move |engine| engine.switch_tab(index)).await??;
    Ok(Envelope::ok().field("tabIndex", active).into_value())
}

/// `GET /internal/tab_info`. `activeTabIndex` is null when no tabs exist;
/// an empty registry is an answerable state here, not an error.
pub async fn tab_info(ctx: &ServerContext) -> Result<Value, ControlError> {
    let info = ctx.submit(|engine| engine.tab_info()).await?;
    Ok(Envelope::ok()
        .field("tabCount", info.count)
        .field("activeTabIndex", info.active)
        .into_value())
}
