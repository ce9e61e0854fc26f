//! Recovery loops
//!
//! One background task per service under recovery. The loop sleeps with a doubling
//! interval capped at `max_retry_interval`, bumps the retry counter on every edge that
//! points at the service and exits once the service is healthy again. It does not probe.

use super::graph::DependencyHealthGraph;
use super::types::HealthStatus;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tracing::debug;

impl DependencyHealthGraph {
    /// Whether a recovery loop is running for the service
    pub fn is_recovering(&self, service_id: &str) -> bool {
        self.recovery_tasks
            .get(service_id)
            .is_some_and(|task| !task.is_finished())
    }

    /// Services with a running recovery loop
    pub fn recovering_services(&self) -> Vec<String> {
        self.recovery_tasks
            .iter()
            .filter(|entry| !entry.value().is_finished())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Start the recovery loop for a service unless one is already running
    pub(crate) fn start_recovery(&self, service_id: &str) {
        if self.is_shut_down() {
            return;
        }

        match self.recovery_tasks.entry(service_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if !entry.get().is_finished() {
                    return;
                }
                entry.insert(self.spawn_recovery_loop(service_id));
            }
            Entry::Vacant(entry) => {
                entry.insert(self.spawn_recovery_loop(service_id));
            }
        }
        debug!(service = %service_id, "Started recovery loop");
    }

    fn spawn_recovery_loop(&self, service_id: &str) -> JoinHandle<()> {
        let graph = self.clone();
        let service = service_id.to_string();
        tokio::spawn(async move { graph.recovery_loop(service).await })
    }

    /// Stop the recovery loop for a service
    pub(crate) fn stop_recovery(&self, service_id: &str) {
        if let Some((_, task)) = self.recovery_tasks.remove(service_id) {
            task.abort();
            debug!(service = %service_id, "Stopped recovery loop");
        }
    }

    async fn recovery_loop(self, service_id: String) {
        let max_interval = self.config.max_retry_interval();
        let mut interval = self.config.initial_recovery_interval().min(max_interval);

        loop {
            tokio::time::sleep(interval).await;

            if self.get_health(&service_id) == HealthStatus::Healthy {
                debug!(service = %service_id, "Recovery loop observed healthy status");
                break;
            }

            self.record_recovery_tick(&service_id);
            debug!(
                service = %service_id,
                interval_ms = interval.as_millis() as u64,
                "Service still recovering"
            );

            interval = interval.saturating_mul(2).min(max_interval);
        }
    }

    fn record_recovery_tick(&self, service_id: &str) {
        let mut edges = self.edges.write();
        let Some(services) = edges.dependents.get(service_id).cloned() else {
            return;
        };
        for service in services {
            if let Some(edge) = edges
                .dependencies
                .get_mut(&service)
                .and_then(|deps| deps.get_mut(service_id))
            {
                edge.retry_count = edge.retry_count.saturating_add(1);
            }
        }
    }
}
