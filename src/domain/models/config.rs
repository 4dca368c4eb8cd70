//! Configuration model for Vigil.

use serde::{Deserialize, Serialize};

/// Main configuration structure for Vigil.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Remote analysis service configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Polling cadence and failure budget
    #[serde(default)]
    pub polling: PollingConfig,

    /// Scan record history store
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote analysis service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// Base URL of the analysis service REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API credential id
    #[serde(default)]
    pub id: String,

    /// API credential secret key
    #[serde(default)]
    pub key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional HTTP(S) proxy URL
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_base_url() -> String {
    "https://analysis.example.com/api/v1".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            id: String::new(),
            key: String::new(),
            timeout_secs: default_timeout_secs(),
            proxy: None,
        }
    }
}

/// Polling cadence and failure budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PollingConfig {
    /// Seconds between poll attempts within a phase
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Consecutive transient service errors tolerated per phase
    #[serde(default = "default_transient_error_budget")]
    pub transient_error_budget: u32,
}

const fn default_interval_secs() -> u64 {
    300
}

const fn default_transient_error_budget() -> u32 {
    5
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            transient_error_budget: default_transient_error_budget(),
        }
    }
}

/// Scan record history store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HistoryConfig {
    /// Directory holding one scan record JSON document per build
    #[serde(default = "default_history_dir")]
    pub dir: String,
}

fn default_history_dir() -> String {
    ".vigil/history".to_string()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: default_history_dir(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json, pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Optional log directory with daily rotation; stderr only when absent
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
