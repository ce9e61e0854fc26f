//! Dependency health types
//!
//! This module defines health states, dependency edge records, the event log entry and
//! the graph configuration.

use crate::config::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Health status levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    /// Service is fully operational
    Healthy,
    /// Service is operational but degraded
    Degraded,
    /// Service is not operational
    Unhealthy,
    /// No status has been reported yet
    Unknown,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 4] = [
        HealthStatus::Healthy,
        HealthStatus::Degraded,
        HealthStatus::Unhealthy,
        HealthStatus::Unknown,
    ];

    /// Ordering used by cascades: a propagated failure never improves a status
    pub fn severity(&self) -> u8 {
        match self {
            HealthStatus::Healthy => 0,
            HealthStatus::Unknown => 1,
            HealthStatus::Degraded => 2,
            HealthStatus::Unhealthy => 3,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HealthStatus::Healthy => "HEALTHY",
            HealthStatus::Degraded => "DEGRADED",
            HealthStatus::Unhealthy => "UNHEALTHY",
            HealthStatus::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HEALTHY" => Ok(HealthStatus::Healthy),
            "DEGRADED" => Ok(HealthStatus::Degraded),
            "UNHEALTHY" => Ok(HealthStatus::Unhealthy),
            "UNKNOWN" => Ok(HealthStatus::Unknown),
            _ => Err(format!("Invalid health status: {}", s)),
        }
    }
}

/// How strongly a service needs a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyType {
    /// Service cannot work without it
    Critical,
    /// Service works in a degraded mode without it
    Required,
    /// Nice to have
    Optional,
    /// Only used when something else fails
    Fallback,
}

impl DependencyType {
    /// Whether a dependency in `status` is healthy enough for an edge of this type
    pub fn accepts(&self, status: HealthStatus) -> bool {
        match self {
            DependencyType::Critical => status == HealthStatus::Healthy,
            DependencyType::Required => {
                matches!(status, HealthStatus::Healthy | HealthStatus::Degraded)
            }
            DependencyType::Optional | DependencyType::Fallback => true,
        }
    }

    /// Edges of this type gate the recovery of the depending service
    pub fn gates_recovery(&self) -> bool {
        matches!(self, DependencyType::Critical | DependencyType::Required)
    }
}

/// Extra information passed along with a status update
pub type FailureInfo = HashMap<String, String>;

/// Build a [`FailureInfo`] carrying only a reason
pub fn failure_reason(reason: &str) -> FailureInfo {
    HashMap::from([("reason".to_string(), reason.to_string())])
}

/// One directed edge `service -> dependency`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyInfo {
    pub dependency_type: DependencyType,
    /// Last known status of the dependency
    pub health_status: HealthStatus,
    /// Failed checks since the last status flip
    pub failure_count: u32,
    /// Successful checks since the last status flip
    pub success_count: u32,
    pub last_check: Option<chrono::DateTime<chrono::Utc>>,
    pub last_failure: Option<chrono::DateTime<chrono::Utc>>,
    pub last_success: Option<chrono::DateTime<chrono::Utc>>,
    /// Recovery ticks observed while the dependency was down
    pub retry_count: u32,
    /// Caller-supplied weight in `0..=1`
    pub impact_score: f64,
}

impl DependencyInfo {
    pub fn new(dependency_type: DependencyType, impact_score: f64, status: HealthStatus) -> Self {
        Self {
            dependency_type,
            health_status: status,
            failure_count: 0,
            success_count: 0,
            last_check: None,
            last_failure: None,
            last_success: None,
            retry_count: 0,
            impact_score,
        }
    }

    /// Mirror a status change of the dependency onto this edge
    pub fn observe_status(&mut self, status: HealthStatus) {
        let now = chrono::Utc::now();
        if self.health_status != status {
            self.failure_count = 0;
            self.success_count = 0;
        }
        self.health_status = status;
        self.last_check = Some(now);
        match status {
            HealthStatus::Healthy => self.last_success = Some(now),
            HealthStatus::Degraded | HealthStatus::Unhealthy => self.last_failure = Some(now),
            HealthStatus::Unknown => {}
        }
    }

    /// Whether the dependency is healthy enough for this edge
    pub fn is_satisfied(&self) -> bool {
        self.dependency_type.accepts(self.health_status)
    }
}

/// A recorded status transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthEvent {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub service: String,
    pub previous: HealthStatus,
    pub status: HealthStatus,
    pub reason: Option<String>,
    /// Service whose transition caused this one, for cascaded updates
    pub source: Option<String>,
}

/// Dependency graph configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Wait before a failure is propagated to dependents (milliseconds)
    #[serde(default = "default_cascade_delay_ms")]
    pub cascade_delay_ms: u64,
    /// First recovery loop interval (milliseconds)
    #[serde(default = "default_initial_recovery_interval_ms")]
    pub initial_recovery_interval_ms: u64,
    /// Cap for the recovery loop interval (seconds)
    #[serde(default = "default_max_retry_interval_secs")]
    pub max_retry_interval_secs: u64,
    /// Interval of the per-service health check loop (seconds)
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,
    /// Maximum number of events kept in the history log
    #[serde(default = "default_event_history_size")]
    pub history_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            cascade_delay_ms: default_cascade_delay_ms(),
            initial_recovery_interval_ms: default_initial_recovery_interval_ms(),
            max_retry_interval_secs: default_max_retry_interval_secs(),
            health_check_interval_secs: default_health_check_interval_secs(),
            history_size: default_event_history_size(),
        }
    }
}

impl GraphConfig {
    pub fn cascade_delay(&self) -> Duration {
        Duration::from_millis(self.cascade_delay_ms)
    }

    pub fn initial_recovery_interval(&self) -> Duration {
        Duration::from_millis(self.initial_recovery_interval_ms)
    }

    pub fn max_retry_interval(&self) -> Duration {
        Duration::from_secs(self.max_retry_interval_secs)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs)
    }
}
