//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber: a stderr
//! layer in the configured format, plus an optional daily-rotated JSON
//! file layer.

use std::io;

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::domain::models::config::LoggingConfig;

/// Keeps the non-blocking file writer alive for the process lifetime.
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

/// Initialize the global subscriber from the logging configuration.
///
/// The returned guard must be held until exit, otherwise buffered file
/// output is lost.
pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    let default_level = parse_log_level(&config.level)?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let stderr_json = config.format == "json";

    if let Some(log_dir) = &config.log_dir {
        let file_appender = rolling::daily(log_dir, "vigil.log");
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking_file)
            .with_ansi(false)
            .with_current_span(true)
            .with_target(true);

        if stderr_json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
        }
        return Ok(LogGuard {
            _guard: Some(guard),
        });
    }

    if stderr_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
    Ok(LogGuard { _guard: None })
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(anyhow!("unknown log level: {other}")),
    }
}
