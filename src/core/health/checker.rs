//! Periodic health check loop
//!
//! The loop does not probe anything. It re-reads the status cached on each outgoing edge
//! of a service and keeps the per-edge success and failure counters up to date, so the
//! counters reflect how long a dependency has been in its current state.

use super::graph::DependencyHealthGraph;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

impl DependencyHealthGraph {
    /// Start the health check loop for a service, replacing any running one
    pub async fn start_monitoring(&self, service_id: &str) {
        if self.is_shut_down() {
            return;
        }

        self.register_service(service_id);

        let graph = self.clone();
        let service = service_id.to_string();
        let check_interval = self.config.health_check_interval();

        let task = tokio::spawn(async move {
            let mut ticker = interval(check_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let checked = graph.run_health_check(&service);
                debug!(service = %service, dependencies = checked, "Ran health check");
            }
        });

        if let Some(previous) = self.check_tasks.insert(service_id.to_string(), task) {
            previous.abort();
        }
        info!(
            service = %service_id,
            interval_secs = check_interval.as_secs(),
            "Started health monitoring"
        );
    }

    /// Stop the health check loop for a service. Returns whether one was running.
    pub fn stop_monitoring(&self, service_id: &str) -> bool {
        match self.check_tasks.remove(service_id) {
            Some((_, task)) => {
                task.abort();
                info!(service = %service_id, "Stopped health monitoring");
                true
            }
            None => false,
        }
    }

    /// Whether a health check loop is running for the service
    pub fn is_monitoring(&self, service_id: &str) -> bool {
        self.check_tasks
            .get(service_id)
            .is_some_and(|task| !task.is_finished())
    }

    /// Run one check over the outgoing edges of a service.
    ///
    /// Returns the number of edges checked.
    pub fn run_health_check(&self, service_id: &str) -> usize {
        let now = chrono::Utc::now();
        let mut edges = self.edges.write();
        let Some(deps) = edges.dependencies.get_mut(service_id) else {
            return 0;
        };

        for edge in deps.values_mut() {
            edge.last_check = Some(now);
            if edge.is_satisfied() {
                edge.success_count = edge.success_count.saturating_add(1);
                edge.last_success = Some(now);
            } else {
                edge.failure_count = edge.failure_count.saturating_add(1);
                edge.last_failure = Some(now);
            }
        }
        deps.len()
    }
}
