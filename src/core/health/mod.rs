//! Dependency health graph
//!
//! This module tracks service-to-dependency edges and per-service health, cascades
//! status changes to dependents and runs one recovery loop per unhealthy service.
//!
//! # Module Structure
//!
//! - `types` - Health states, edge records, events and configuration
//! - `graph` - The graph structure, edge management and task ownership
//! - `propagation` - Status transitions and failure/recovery cascades
//! - `recovery` - Per-service recovery loops
//! - `checker` - Mirror-only periodic health check loop
//! - `metrics` - Metrics snapshot
//! - `tests` - Test suite for the dependency health graph

pub mod checker;
pub mod graph;
pub mod metrics;
pub mod propagation;
pub mod recovery;
pub mod types;

pub use graph::DependencyHealthGraph;
pub use metrics::{GraphMetrics, ServiceMetrics};
pub use types::{
    DependencyInfo, DependencyType, FailureInfo, GraphConfig, HealthEvent, HealthStatus,
    failure_reason,
};
