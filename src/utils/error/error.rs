//! Error handling for the resilience core
//!
//! This module defines the error types returned by the fallible parts of the crate:
//! graph mutation and configuration loading. Classification, delay computation and
//! health propagation never surface errors to callers.

use thiserror::Error;

/// Result type alias for the resilience core
pub type Result<T> = std::result::Result<T, MeshError>;

/// Main error type for the resilience core
#[derive(Error, Debug)]
pub enum MeshError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A dependency edge that was expected to exist is missing
    #[error("Dependency not found: {service} -> {dependency}")]
    DependencyNotFound { service: String, dependency: String },

    /// Impact scores are weights in `0..=1`
    #[error("Invalid impact score: {0} (expected a value between 0 and 1)")]
    InvalidImpactScore(f64),

    /// A service cannot depend on itself
    #[error("Service cannot depend on itself: {0}")]
    SelfDependency(String),
}

impl MeshError {
    /// Create a dependency-not-found error
    pub fn dependency_not_found(service: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::DependencyNotFound {
            service: service.into(),
            dependency: dependency.into(),
        }
    }

    /// Stable machine-readable code, used as a log/metric label
    pub fn error_code(&self) -> &'static str {
        match self {
            MeshError::Config(_) => "CONFIG_ERROR",
            MeshError::Io(_) => "IO_ERROR",
            MeshError::Yaml(_) => "YAML_ERROR",
            MeshError::Serialization(_) => "SERIALIZATION_ERROR",
            MeshError::Validation(_) => "VALIDATION_ERROR",
            MeshError::DependencyNotFound { .. } => "DEPENDENCY_NOT_FOUND",
            MeshError::InvalidImpactScore(_) => "INVALID_IMPACT_SCORE",
            MeshError::SelfDependency(_) => "SELF_DEPENDENCY",
        }
    }
}
