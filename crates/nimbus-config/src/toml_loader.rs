//! TOML config file loading.

use crate::schema::ControlConfig;
use nimbus_common::ConfigError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Load config from a specific TOML file path.
pub fn load_from_path(path: &Path) -> Result<ControlConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: ControlConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform default path, falling back to defaults if
/// no file exists. A present-but-broken file is an error rather than a
/// silent fallback.
pub fn load_default() -> Result<ControlConfig, ConfigError> {
    let path = default_config_path()?;
    if !path.exists() {
        info!("no config at {}, using defaults", path.display());
        return Ok(ControlConfig::default());
    }
    load_from_path(&path)
}

/// Platform-specific default config file path
/// (e.g. `~/.config/nimbus/config.toml` on Linux).
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("nimbus").join("config.toml"))
}
