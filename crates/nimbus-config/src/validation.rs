//! Config validation.

use crate::schema::ControlConfig;
use nimbus_common::ConfigError;

/// Reject configs that would make the control plane inoperable.
pub fn validate(config: &ControlConfig) -> Result<(), ConfigError> {
    if config.socket_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "socket_path must not be empty".into(),
        ));
    }
    if config.max_request_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "max_request_bytes must be > 0".into(),
        ));
    }
    if config.marshal_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "marshal_timeout_ms must be > 0".into(),
        ));
    }
    if config.navigation_wait_ms < config.content_wait_ms {
        return Err(ConfigError::ValidationError(
            "navigation_wait_ms must be >= content_wait_ms".into(),
        ));
    }
    Ok(())
}
