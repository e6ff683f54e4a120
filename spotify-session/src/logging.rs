//! Logging bootstrap
//!
//! The SDK logs through `tracing` everywhere; this module wires up a
//! subscriber for embedders that do not bring their own. The default is
//! silent, since the usual host is a scripting runtime whose stdout and
//! stderr belong to the embedding application.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// How much the SDK writes to stderr
#[derive(Debug, Clone, Copy)]
pub enum LoggingMode {
    /// No subscriber installed; all log records are dropped
    Silent,
    /// Compact stderr output for development
    Development,
    /// Verbose output with source locations
    Debug,
}

/// Logging setup error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Install a subscriber for the given mode.
///
/// Call once, before creating the session. Embedders with their own
/// `tracing` setup skip this entirely.
///
/// # Environment variables
///
/// - `SPOTIFY_LOG_LEVEL`: level or directive string, tried first
/// - `RUST_LOG`: fallback directive string
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(env_filter("info"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::SubscriberInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(env_filter("debug"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::SubscriberInit(e.to_string()))
        }
    }
}

/// Pick the mode from `SPOTIFY_LOG_MODE` (`silent`, `development` or
/// `debug`), defaulting to silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("SPOTIFY_LOG_MODE").as_deref() {
        Ok("development") => LoggingMode::Development,
        Ok("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    };
    init_logging(mode)
}

fn env_filter(default_level: &str) -> EnvFilter {
    if let Ok(directives) = std::env::var("SPOTIFY_LOG_LEVEL") {
        EnvFilter::new(directives)
    } else if let Ok(directives) = std::env::var("RUST_LOG") {
        EnvFilter::new(directives)
    } else {
        EnvFilter::new(default_level)
    }
}
