//! Configuration utilities - loading from disk and environment overrides
//!
//! The configuration is loaded once in `main` and handed to the components
//! that need it; there is no global config instance.
use std::path::Path;

use super::schemas::Config;

use crate::logger::{self, LogTag};

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value '{value}' for environment variable {key}")]
    InvalidOverride { key: String, value: String },
}

/// Load configuration from a specific file path with environment overrides
///
/// A missing file is not an error: defaults are used instead.
pub fn load_config_from_path(path: &str) -> Result<Config, ConfigError> {
    let mut config = read_config_file(path)?;
    apply_env_overrides(&mut config, &|key| std::env::var(key).ok())?;
    Ok(config)
}

/// Read and parse the TOML file, without environment overrides
pub fn read_config_file(path: &str) -> Result<Config, ConfigError> {
    if !Path::new(path).exists() {
        logger::warning(
            LogTag::Config,
            &format!("⚠️  Config file '{}' not found, using default values", path),
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;

    let config = toml::from_str::<Config>(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;

    logger::debug(LogTag::Config, &format!("Loaded config from '{}'", path));

    Ok(config)
}

/// Apply environment overrides to every config section
pub fn apply_env_overrides<F>(config: &mut Config, lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    config.live.apply_env(lookup)?;
    config.webserver.apply_env(lookup)?;
    config.database.apply_env(lookup)?;
    Ok(())
}
