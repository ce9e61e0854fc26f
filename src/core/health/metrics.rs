//! Graph metrics snapshot

use super::graph::DependencyHealthGraph;
use super::types::{HealthEvent, HealthStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::Ordering;

/// Per-service view in a [`GraphMetrics`] snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetrics {
    pub status: HealthStatus,
    /// Number of services this one depends on
    pub dependency_count: usize,
    /// Number of services depending on this one
    pub dependent_count: usize,
    pub recovering: bool,
}

/// Point-in-time snapshot of the graph for an external metrics sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub services: BTreeMap<String, ServiceMetrics>,
    /// Number of services per status; every status is present
    pub health_summary: HashMap<HealthStatus, usize>,
    /// Recorded transitions, oldest first
    pub pattern_history: Vec<HealthEvent>,
    /// Dependents skipped during cascades because of an error
    pub propagation_failures: u64,
    pub active_recovery_loops: usize,
    pub total_edges: usize,
}

impl GraphMetrics {
    /// Count of services in `status`
    pub fn count(&self, status: HealthStatus) -> usize {
        self.health_summary.get(&status).copied().unwrap_or(0)
    }
}

impl DependencyHealthGraph {
    /// Take a metrics snapshot
    pub fn get_metrics(&self) -> GraphMetrics {
        let mut health_summary: HashMap<HealthStatus, usize> =
            HealthStatus::ALL.iter().map(|status| (*status, 0)).collect();

        let mut services = BTreeMap::new();
        let total_edges;
        {
            let edges = self.edges.read();
            total_edges = edges.dependencies.values().map(HashMap::len).sum();

            for entry in self.health.iter() {
                let service = entry.key();
                let status = *entry.value();
                *health_summary.entry(status).or_default() += 1;
                services.insert(
                    service.clone(),
                    ServiceMetrics {
                        status,
                        dependency_count: edges.dependencies.get(service).map_or(0, HashMap::len),
                        dependent_count: edges.dependents.get(service).map_or(0, |s| s.len()),
                        recovering: false,
                    },
                );
            }
        }

        let recovering = self.recovering_services();
        for service in &recovering {
            if let Some(metrics) = services.get_mut(service) {
                metrics.recovering = true;
            }
        }

        GraphMetrics {
            timestamp: chrono::Utc::now(),
            services,
            health_summary,
            pattern_history: self.event_history(),
            propagation_failures: self.propagation_failures.load(Ordering::Relaxed),
            active_recovery_loops: recovering.len(),
            total_edges,
        }
    }
}
