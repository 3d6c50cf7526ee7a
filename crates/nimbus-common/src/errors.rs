use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("view no longer exists")]
    ViewGone,

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Failure kinds surfaced by control-plane operations. Each maps onto the
/// uniform `{success:false, error}` envelope; none of them terminates the
/// process.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("engine is shutting down")]
    ShuttingDown,

    #[error("invalid tab index {index} ({count} tabs open)")]
    TabNotFound { index: usize, count: usize },

    #[error("no open tabs")]
    NoTabs,

    #[error("page is still loading")]
    LoadTimeout,

    #[error("operation timed out waiting for the ui thread")]
    UiTimeout,

    #[error("{0}")]
    Protocol(String),

    #[error("{0}")]
    Execution(String),

    #[error("could not decode script result: {0}")]
    Parse(String),

    #[error("screenshot capture failed: {0}")]
    Capture(String),

    #[error("engine error: {0}")]
    Engine(String),
}

impl From<EngineError> for ControlError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::ViewGone => ControlError::ShuttingDown,
            EngineError::Capture(msg) => ControlError::Capture(msg),
            EngineError::Backend(msg) => ControlError::Engine(msg),
        }
    }
}
