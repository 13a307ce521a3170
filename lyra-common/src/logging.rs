//! Logging initialisation
//!
//! `RUST_LOG` takes precedence over the configured level so individual
//! modules can be traced without editing the config file.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", config.level, e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(config.with_target)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| Error::Internal(format!("Logging already initialised: {}", e)))
}
