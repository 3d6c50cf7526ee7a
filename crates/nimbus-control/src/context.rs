//! The server context handed to every handler.
//!
//! One instance is constructed at startup and cloned per connection; it
//! bundles the thread marshaler and the configuration so handlers never
//! reach for process-global state.

use std::sync::Arc;
use std::time::Duration;

use nimbus_common::ControlError;
use nimbus_config::ControlConfig;
use nimbus_engine::{Engine, UiExecutor};

#[derive(Clone)]
pub struct ServerContext {
    pub executor: UiExecutor,
    pub config: Arc<ControlConfig>,
}

impl ServerContext {
    pub fn new(executor: UiExecutor, config: Arc<ControlConfig>) -> Self {
        Self { executor, config }
    }

    pub fn marshal_timeout(&self) -> Duration {
        Duration::from_millis(self.config.marshal_timeout_ms)
    }

    pub fn navigation_wait(&self) -> Duration {
        Duration::from_millis(self.config.navigation_wait_ms)
    }

    pub fn content_wait(&self) -> Duration {
        Duration::from_millis(self.config.content_wait_ms)
    }

    pub fn script_timeout(&self) -> Duration {
        Duration::from_millis(self.config.script_timeout_ms)
    }

    /// Marshal `work` onto the ui context with the configured timeout.
    pub async fn submit<R, F>(&self, work: F) -> Result<R, ControlError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Engine) -> R + Send + 'static,
    {
        self.executor.submit(self.marshal_timeout(), work).await
    }
}
