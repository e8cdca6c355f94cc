//! Logging setup for applications built on state-store
//!
//! The library itself only emits `tracing` events:
//! - `trace`: every commit and action invocation
//! - `debug`: store creation, subscribe and unsubscribe
//! - `warn`: a listener panicked during notification
//!
//! This module installs a `tracing-subscriber` for binaries that want to see
//! them. TUI front-ends should stay on [`LoggingMode::Silent`].

use std::str::FromStr;

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable selecting the logging mode
pub const LOG_MODE_ENV: &str = "SHALLOWSTATE_LOG_MODE";

/// Environment variable overriding the log filter
pub const LOG_LEVEL_ENV: &str = "SHALLOWSTATE_LOG_LEVEL";

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No output
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with thread ids and source locations
    Debug,
}

impl FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silent" => Ok(LoggingMode::Silent),
            "development" | "dev" => Ok(LoggingMode::Development),
            "debug" => Ok(LoggingMode::Debug),
            other => Err(LoggingError::InvalidMode(other.to_string())),
        }
    }
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Unknown logging mode: {0}")]
    InvalidMode(String),

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}

/// Initialize logging with the specified mode
///
/// `level` overrides the filter; otherwise `SHALLOWSTATE_LOG_LEVEL`, then
/// `RUST_LOG`, then the mode's default is used.
///
/// # Examples
///
/// ```rust,ignore
/// state_store::logging::init_logging(LoggingMode::Development, None)?;
/// state_store::logging::init_logging(LoggingMode::Debug, Some("state_store=trace"))?;
/// ```
pub fn init_logging(mode: LoggingMode, level: Option<&str>) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter(level, "info")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter(level, "debug")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize logging from `SHALLOWSTATE_LOG_MODE`
///
/// Unset or unrecognised values fall back to silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = std::env::var(LOG_MODE_ENV)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(LoggingMode::Silent);

    init_logging(mode, None)
}

/// Check if a global subscriber has been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

/// Check filter directives without installing anything
///
/// Lets a binary reject a bad `--log-level` before any work starts, even in
/// [`LoggingMode::Silent`] where the filter is never built.
pub fn validate_filter(directives: &str) -> Result<(), LoggingError> {
    parse_filter(directives).map(|_| ())
}

fn parse_filter(directives: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directives).map_err(|e| LoggingError::InvalidFilter(format!("'{}': {}", directives, e)))
}

fn create_env_filter(level: Option<&str>, default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directives = match level {
        Some(level) => level.to_string(),
        None => std::env::var(LOG_LEVEL_ENV)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| default_level.to_string()),
    };

    parse_filter(&directives)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent, None).is_ok());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("silent".parse::<LoggingMode>().unwrap(), LoggingMode::Silent);
        assert_eq!("Dev".parse::<LoggingMode>().unwrap(), LoggingMode::Development);
        assert_eq!("DEBUG".parse::<LoggingMode>().unwrap(), LoggingMode::Debug);
        assert!(matches!(
            "loud".parse::<LoggingMode>(),
            Err(LoggingError::InvalidMode(mode)) if mode == "loud"
        ));
    }

    #[test]
    fn test_explicit_filter_is_validated() {
        assert!(create_env_filter(Some("state_store=trace"), "info").is_ok());
        assert!(matches!(
            create_env_filter(Some("state_store=notalevel"), "info"),
            Err(LoggingError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_validate_filter() {
        assert!(validate_filter("debug").is_ok());
        assert!(validate_filter("state_store=trace,garage=info").is_ok());

        let err = validate_filter("state_store=notalevel").unwrap_err();
        assert!(err.to_string().contains("state_store=notalevel"));
    }
}
