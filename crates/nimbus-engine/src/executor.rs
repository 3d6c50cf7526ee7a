//! The thread marshaler.
//!
//! [`UiExecutor`] is the only bridge from I/O tasks into the ui context.
//! Work items execute strictly in submission order, one at a time, on
//! whichever thread drives the [`UiRunner`] (the winit event loop in
//! production, a dedicated thread in tests). A timed-out submission
//! unblocks the caller immediately; the enqueued work still runs to
//! completion and its result is dropped — the engine has no preemption
//! point, so the unit is never aborted mid-flight.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use nimbus_common::ControlError;
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

use crate::engine::Engine;

type UiTask = Box<dyn FnOnce(&mut Engine) + Send + 'static>;
type Waker = Box<dyn Fn() + Send + Sync + 'static>;

/// Create a connected executor/runner pair.
pub fn ui_channel() -> (UiExecutor, UiRunner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        UiExecutor {
            tx,
            waker: Arc::new(OnceLock::new()),
        },
        UiRunner { rx },
    )
}

/// Cloneable handle for submitting work to the ui context.
#[derive(Clone)]
pub struct UiExecutor {
    tx: mpsc::UnboundedSender<UiTask>,
    waker: Arc<OnceLock<Waker>>,
}

impl UiExecutor {
    /// Install the callback that nudges the ui thread after a submit
    /// (an `EventLoopProxy` wake in the app). Without one, the runner is
    /// expected to be blocked on the queue itself.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        let _ = self.waker.set(Box::new(waker));
    }

    /// Whether the ui context can still accept work.
    pub fn is_live(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Run `work` on the ui context and await its result for at most
    /// `timeout`. On expiry the caller gets [`ControlError::UiTimeout`]
    /// and the eventual result is discarded. Fails with `ShuttingDown`
    /// without enqueueing if the ui context is gone.
    pub async fn submit<R, F>(&self, timeout: Duration, work: F) -> Result<R, ControlError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Engine) -> R + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let task: UiTask = Box::new(move |engine| {
            // The receiver may be gone already (caller timed out); the
            // result is dropped in that case.
            let _ = result_tx.send(work(engine));
        });

        self.tx.send(task).map_err(|_| ControlError::ShuttingDown)?;
        if let Some(waker) = self.waker.get() {
            waker();
        }

        match tokio::time::timeout(timeout, result_rx).await {
            Ok(Ok(value)) => Ok(value),
            // Runner dropped the task (or itself) without completing it.
            Ok(Err(_)) => Err(ControlError::ShuttingDown),
            Err(_) => {
                trace!("marshaled unit timed out; result will be discarded");
                Err(ControlError::UiTimeout)
            }
        }
    }
}

/// Consumer half: owned by the thread that hosts the engine.
pub struct UiRunner {
    rx: mpsc::UnboundedReceiver<UiTask>,
}

impl UiRunner {
    /// Execute all queued work. Called from the event loop each time the
    /// waker fires (and opportunistically on redraws).
    pub fn drain(&mut self, engine: &mut Engine) {
        while let Ok(task) = self.rx.try_recv() {
            engine.pump();
            task(engine);
        }
        engine.pump();
    }

    /// Block on the queue until every executor handle is dropped. For
    /// headless hosts and tests; must not be called from async context.
    pub fn run(mut self, engine: &mut Engine) {
        while let Some(task) = self.rx.blocking_recv() {
            engine.pump();
            task(engine);
        }
    }
}
