//! Test fixtures
//!
//! Configurations with millisecond timings and no jitter, plus small graph topologies.

use mesh_resilience::{
    BackoffConfig, DependencyHealthGraph, DependencyType, GraphConfig, HealthStatus, RetryPolicy,
};
use std::time::Duration;

/// Graph configuration with millisecond-scale timings
pub fn fast_graph_config() -> GraphConfig {
    GraphConfig {
        cascade_delay_ms: 10,
        initial_recovery_interval_ms: 10,
        max_retry_interval_secs: 1,
        health_check_interval_secs: 1,
        history_size: 256,
    }
}

/// Backoff configuration without jitter
pub fn fixed_backoff_config() -> BackoffConfig {
    BackoffConfig {
        jitter: 0.0,
        ..Default::default()
    }
}

/// Retry policy without jitter
pub fn fixed_retry_policy() -> RetryPolicy {
    RetryPolicy {
        jitter_factor: 0.0,
        ..Default::default()
    }
}

/// A graph under test that is shut down when the fixture is consumed
pub struct GraphFixture {
    pub graph: DependencyHealthGraph,
}

impl GraphFixture {
    pub fn new() -> Self {
        Self {
            graph: DependencyHealthGraph::new(fast_graph_config()),
        }
    }

    /// Add edges given as `(service, dependency, type)`
    pub fn with_edges(edges: &[(&str, &str, DependencyType)]) -> Self {
        let fixture = Self::new();
        for (service, dependency, dependency_type) in edges {
            fixture
                .graph
                .add_dependency(service, dependency, *dependency_type, 1.0)
                .unwrap();
        }
        fixture
    }

    /// Report a status and wait for the resulting cascades
    pub async fn report(&self, service: &str, status: HealthStatus) {
        self.graph.update_health(service, status, None).await;
        self.settle().await;
    }

    pub async fn report_all(&self, services: &[&str], status: HealthStatus) {
        for service in services {
            self.graph.update_health(service, status, None).await;
        }
        self.settle().await;
    }

    pub async fn settle(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.graph.wait_for_cascades())
            .await
            .expect("cascades did not settle in time");
    }

    pub fn status(&self, service: &str) -> HealthStatus {
        self.graph.get_health(service)
    }

    pub async fn finish(self) {
        self.graph.shutdown().await;
    }
}

impl Default for GraphFixture {
    fn default() -> Self {
        Self::new()
    }
}
