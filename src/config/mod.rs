//! Configuration management
//!
//! This module handles loading and validation of the resilience configuration.
//! Every key is optional; missing keys fall back to the defaults in [`defaults`].

pub mod defaults;
pub mod validation;

pub use validation::Validate;

use crate::core::backoff::BackoffConfig;
use crate::core::health::GraphConfig;
use crate::core::retry::RetryPolicy;
use crate::utils::error::{MeshError, Result};
use crate::utils::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Dependency health graph
    #[serde(default)]
    pub graph: GraphConfig,
    /// Adaptive backoff engine
    #[serde(default)]
    pub backoff: BackoffConfig,
    /// Retry classifier policy
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ResilienceConfig {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path).await?;

        let config = Self::from_yaml_str(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document is a valid all-defaults configuration
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.graph
            .validate()
            .map_err(|e| MeshError::Validation(format!("Graph config error: {}", e)))?;
        self.backoff
            .validate()
            .map_err(|e| MeshError::Validation(format!("Backoff config error: {}", e)))?;
        self.retry
            .validate()
            .map_err(|e| MeshError::Validation(format!("Retry config error: {}", e)))?;
        self.logging
            .validate()
            .map_err(|e| MeshError::Validation(format!("Logging config error: {}", e)))?;

        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
