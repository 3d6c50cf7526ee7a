//! Bounded load-state polling.
//!
//! Callers decide what a `false` return means: navigation-class operations
//! treat it as a hard failure ("page is still loading"), content-class
//! operations proceed anyway and flag the response with
//! `loadWaitTimedOut: true`.

use std::time::Duration;

use nimbus_common::{ControlError, LoadState};
use tokio::time::Instant;

use crate::executor::UiExecutor;

/// How often the waiter samples the tab's load state.
pub const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll the load state of `tab` until it reports `Loaded` or `bound`
/// elapses. Returns `Ok(true)` when loaded, `Ok(false)` on bound expiry.
/// Registry errors (tab closed mid-wait, engine shutdown) propagate.
pub async fn wait_for_load(
    executor: &UiExecutor,
    marshal_timeout: Duration,
    tab: usize,
    bound: Duration,
) -> Result<bool, ControlError> {
    let deadline = Instant::now() + bound;
    loop {
        let state = executor
            .submit(marshal_timeout, move |engine| engine.load_state(tab))
            .await??;
        if state == LoadState::Loaded {
            return Ok(true);
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(LOAD_POLL_INTERVAL.min(deadline - now)).await;
    }
}
