//! Logging setup
//!
//! Installs a `tracing-subscriber` fmt subscriber writing to stderr, so
//! stdout stays reserved for JSON-RPC traffic. `RUST_LOG` takes precedence
//! over the configured level.

use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter '{level}': {reason}")]
    InvalidFilter { level: String, reason: String },

    #[error("a global subscriber is already installed")]
    AlreadyInstalled,
}

fn build_env_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(level).map_err(|e| LoggingError::InvalidFilter {
        level: level.to_string(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber
pub fn init_logging(level: &str) -> Result<(), LoggingError> {
    let filter = build_env_filter(level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filters_parse() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("table_tracker=debug,warn").is_ok());
    }
}
