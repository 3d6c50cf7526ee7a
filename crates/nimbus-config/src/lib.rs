//! Nimbus configuration.
//!
//! TOML-based config with serde defaults so partial files work out of the
//! box. The control-socket path can additionally be overridden through the
//! `NIMBUS_CONTROL_SOCKET` environment variable, which wins over both the
//! file and the built-in default.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::ControlConfig;

use nimbus_common::ConfigError;

/// Environment variable overriding the control-socket path.
pub const SOCKET_ENV_VAR: &str = "NIMBUS_CONTROL_SOCKET";

/// Load config from the platform default path, then apply env overrides
/// and validate.
pub fn load_config() -> Result<ControlConfig, ConfigError> {
    let mut config = toml_loader::load_default()?;
    apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit file path (CLI override), then apply env
/// overrides and validate. Unlike [`load_config`], a missing file here is
/// an error.
pub fn load_config_from(path: &std::path::Path) -> Result<ControlConfig, ConfigError> {
    let mut config = toml_loader::load_from_path(path)?;
    apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut ControlConfig) {
    if let Ok(path) = std::env::var(SOCKET_ENV_VAR) {
        if !path.is_empty() {
            tracing::info!("control socket overridden by {SOCKET_ENV_VAR}: {path}");
            config.socket_path = path.into();
        }
    }
}
