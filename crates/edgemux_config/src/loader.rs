//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{MuxConfig, MAX_SUPPORTED_ARITY, MIN_SUPPORTED_ARITY};
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "edgemux.toml";

/// Loads and validates an `edgemux.toml` configuration from a directory.
///
/// Reads `<dir>/edgemux.toml`, parses it, and validates value ranges.
pub fn load_config(dir: &Path) -> Result<MuxConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates an `edgemux.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<MuxConfig, ConfigError> {
    let config: MuxConfig =
        toml::from_str(content).map_err(|e| ConfigError::Malformed(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates arity bounds and pool sizing.
fn validate_config(config: &MuxConfig) -> Result<(), ConfigError> {
    let batching = &config.batching;
    if batching.min_arity < MIN_SUPPORTED_ARITY {
        return Err(ConfigError::OutOfRange {
            key: "batching.min_arity",
            reason: format!(
                "must be >= {MIN_SUPPORTED_ARITY}, got {}",
                batching.min_arity
            ),
        });
    }
    if batching.max_arity > MAX_SUPPORTED_ARITY {
        return Err(ConfigError::OutOfRange {
            key: "batching.max_arity",
            reason: format!(
                "must be <= {MAX_SUPPORTED_ARITY}, got {}",
                batching.max_arity
            ),
        });
    }
    if batching.max_arity < batching.min_arity {
        return Err(ConfigError::OutOfRange {
            key: "batching.max_arity",
            reason: format!(
                "{} must not be below batching.min_arity ({})",
                batching.max_arity, batching.min_arity
            ),
        });
    }
    if config.pool.capacity == 0 {
        return Err(ConfigError::OutOfRange {
            key: "pool.capacity",
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}
