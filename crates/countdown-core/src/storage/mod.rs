mod config;

pub use config::{Config, DisplayConfig, LogConfig, TimerConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `<config dir>/countdown[-dev]/` based on COUNTDOWN_ENV.
///
/// Set COUNTDOWN_ENV=dev to use a development directory, or
/// COUNTDOWN_CONFIG_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if no config directory can be determined or if
/// creating it fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("COUNTDOWN_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
            let env = std::env::var("COUNTDOWN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("countdown-dev")
            } else {
                base_dir.join("countdown")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
