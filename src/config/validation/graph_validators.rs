//! Dependency graph and logging validators

use super::trait_def::Validate;
use crate::core::health::GraphConfig;
use crate::utils::logging::LoggingConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

impl Validate for GraphConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating dependency graph configuration");

        if self.initial_recovery_interval_ms == 0 {
            return Err("Initial recovery interval must be greater than 0".to_string());
        }

        if self.max_retry_interval_secs == 0 {
            return Err("Max retry interval must be greater than 0".to_string());
        }

        if self.initial_recovery_interval() > self.max_retry_interval() {
            return Err(
                "Max retry interval must not be below the initial recovery interval".to_string(),
            );
        }

        if self.health_check_interval_secs == 0 {
            return Err("Health check interval must be greater than 0".to_string());
        }

        if self.history_size == 0 {
            return Err("Event history size must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("Invalid log filter '{}': {}", self.level, e))
    }
}
