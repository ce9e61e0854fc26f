//! Logging setup
//!
//! The crate logs through `tracing`; this module installs the `tracing_subscriber`
//! formatter used by the binary and by embedders that do not bring their own.

pub mod types;

pub use types::{LogFormat, LoggingConfig};

use crate::utils::error::{MeshError, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set, the configured level otherwise
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| MeshError::Config(format!("Invalid log filter '{}': {}", config.level, e)))
}

/// Install the global subscriber.
///
/// A subscriber that is already installed is left in place.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let installed = match config.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .try_init(),
    };

    if installed.is_err() {
        debug!("Global subscriber already installed, keeping it");
    }
    Ok(())
}
