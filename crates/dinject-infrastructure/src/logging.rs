//! Structured logging with tracing
//!
//! The engines emit `tracing` events; this module installs a subscriber for
//! binaries and tests that want to see them.

use dinject_domain::error::{Error, Result};

pub use crate::config::LoggingConfig;
use crate::constants::LOG_ENV_VAR;
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with the provided configuration
///
/// `DINJECT_LOG` overrides the configured level. Fails if a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = Registry::default().with(filter);

    let installed = if config.json_format {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    installed.map_err(|err| Error::Configuration {
        message: format!("Failed to install log subscriber: {err}"),
        source: Some(Box::new(err)),
    })?;

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::configuration(format!(
            "Invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}

/// Log settings loading status
pub fn log_settings_loaded(path: &std::path::Path, found: bool) {
    if found {
        info!("Settings loaded from {}", path.display());
    } else {
        debug!("Settings file not found: {}", path.display());
    }
}
