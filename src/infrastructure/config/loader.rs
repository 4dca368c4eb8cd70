use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("API base URL cannot be empty")]
    EmptyBaseUrl,

    #[error("Invalid request timeout: {0}. Must be at least 1 second")]
    InvalidTimeout(u64),

    #[error("Invalid poll interval: {0}. Must be at least 1 second")]
    InvalidPollInterval(u64),

    #[error("Invalid transient error budget: {0}. Cannot be 0")]
    InvalidTransientBudget(u32),

    #[error("History directory cannot be empty")]
    EmptyHistoryDir,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .vigil/config.yaml (project config)
    /// 3. .vigil/local.yaml (project local overrides, optional)
    /// 4. Environment variables (VIGIL_* prefix, highest priority)
    ///
    /// Credentials usually arrive via `VIGIL_API__ID` / `VIGIL_API__KEY`
    /// so they stay out of the checked-in config file.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".vigil/config.yaml"))
            .merge(Yaml::file(".vigil/local.yaml"))
            .merge(Env::prefixed("VIGIL_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("VIGIL_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.api.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if config.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.api.timeout_secs));
        }
        if config.polling.interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval(config.polling.interval_secs));
        }
        if config.polling.transient_error_budget == 0 {
            return Err(ConfigError::InvalidTransientBudget(
                config.polling.transient_error_budget,
            ));
        }
        if config.history.dir.trim().is_empty() {
            return Err(ConfigError::EmptyHistoryDir);
        }
        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(ConfigError::InvalidLogLevel(other.to_string())),
        }
        match config.logging.format.as_str() {
            "json" | "pretty" => {}
            other => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        }
        Ok(())
    }
}
