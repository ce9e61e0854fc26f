//! Health status transitions and cascades
//!
//! `update_health` applies a transition under the service's transition lock and hands
//! any fan-out to a background cascade task. Cascades walk the reverse edges breadth
//! first with a visited set, so cyclic graphs terminate. A failure processing one
//! dependent is logged and counted and never stops its siblings.

use super::graph::DependencyHealthGraph;
use super::types::{DependencyType, FailureInfo, HealthStatus, failure_reason};
use crate::utils::error::{MeshError, Result};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::Ordering;
use tracing::{debug, info, warn};

const CRITICAL_DEPENDENCY_FAILED: &str = "critical_dependency_failed";
const REQUIRED_DEPENDENCY_FAILED: &str = "required_dependency_failed";
const DEPENDENCIES_RECOVERED: &str = "dependencies_recovered";

#[derive(Debug, Clone, Copy)]
enum CascadeKind {
    Failure,
    Recovery,
}

impl DependencyHealthGraph {
    /// Report a status for a service.
    ///
    /// Transitions for one service are applied in call order. A transition to
    /// `Unhealthy` starts the service's recovery loop and, after the cascade delay,
    /// propagates to its dependents; a transition to `Healthy` stops the loop and
    /// re-evaluates dependents whose gating dependencies are all healthy enough.
    pub async fn update_health(
        &self,
        service_id: &str,
        status: HealthStatus,
        failure_info: Option<FailureInfo>,
    ) {
        let info = failure_info.unwrap_or_default();
        let lock = self.transition_lock(service_id);
        let _guard = lock.lock().await;

        let previous = self.apply_status(service_id, status, &info, None);
        if previous == status {
            return;
        }

        info!(
            service = %service_id,
            %previous,
            %status,
            reason = info.get("reason").map(String::as_str).unwrap_or(""),
            "Health status changed"
        );

        match status {
            HealthStatus::Unhealthy => {
                self.start_recovery(service_id);
                self.spawn_cascade(CascadeKind::Failure, service_id);
            }
            HealthStatus::Healthy => {
                self.stop_recovery(service_id);
                self.spawn_cascade(CascadeKind::Recovery, service_id);
            }
            HealthStatus::Degraded | HealthStatus::Unknown => {}
        }
    }

    /// Wait until every in-flight cascade has finished
    pub async fn wait_for_cascades(&self) {
        loop {
            let tasks: Vec<_> = self.cascade_tasks.lock().drain(..).collect();
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                let _ = task.await;
            }
        }
    }

    /// Number of cascades still running
    pub fn pending_cascades(&self) -> usize {
        self.cascade_tasks
            .lock()
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    fn spawn_cascade(&self, kind: CascadeKind, service_id: &str) {
        // Shutdown flips the flag under this lock, so no task can slip past its drain
        let mut tasks = self.cascade_tasks.lock();
        if self.is_shut_down() {
            return;
        }

        let graph = self.clone();
        let root = service_id.to_string();
        let task = tokio::spawn(async move {
            match kind {
                CascadeKind::Failure => graph.run_failure_cascade(root).await,
                CascadeKind::Recovery => graph.run_recovery_cascade(root).await,
            }
        });

        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
    }

    async fn run_failure_cascade(&self, root: String) {
        let mut visited = HashSet::from([root.clone()]);
        let mut frontier = vec![root];

        while !frontier.is_empty() {
            tokio::time::sleep(self.config.cascade_delay()).await;

            // Services that recovered during the delay are not propagated
            frontier.retain(|service| self.get_health(service) == HealthStatus::Unhealthy);

            let mut next = Vec::new();
            for failed in &frontier {
                for dependent in self.dependents_of(failed) {
                    if visited.contains(&dependent) {
                        continue;
                    }
                    match self.propagate_failure(&dependent, failed).await {
                        Ok(Some(HealthStatus::Unhealthy)) => {
                            visited.insert(dependent.clone());
                            next.push(dependent);
                        }
                        Ok(_) => {}
                        Err(e) => self.record_propagation_failure(&dependent, failed, &e),
                    }
                }
            }
            frontier = next;
        }
    }

    async fn run_recovery_cascade(&self, root: String) {
        let mut visited = HashSet::from([root.clone()]);
        let mut queue = VecDeque::from([root]);

        while let Some(recovered) = queue.pop_front() {
            for dependent in self.dependents_of(&recovered) {
                if visited.contains(&dependent) {
                    continue;
                }
                match self.propagate_recovery(&dependent, &recovered).await {
                    Ok(true) => {
                        visited.insert(dependent.clone());
                        queue.push_back(dependent);
                    }
                    Ok(false) => {}
                    Err(e) => self.record_propagation_failure(&dependent, &recovered, &e),
                }
            }
        }
    }

    /// Apply the effect of `failed` going down to one dependent.
    ///
    /// Returns the dependent's new status if it changed.
    async fn propagate_failure(
        &self,
        dependent: &str,
        failed: &str,
    ) -> Result<Option<HealthStatus>> {
        let dependency_type = self
            .get_dependency(dependent, failed)
            .map(|edge| edge.dependency_type)
            .ok_or_else(|| MeshError::dependency_not_found(dependent, failed))?;

        let (status, reason) = match dependency_type {
            DependencyType::Critical => (HealthStatus::Unhealthy, CRITICAL_DEPENDENCY_FAILED),
            DependencyType::Required => (HealthStatus::Degraded, REQUIRED_DEPENDENCY_FAILED),
            DependencyType::Optional | DependencyType::Fallback => {
                debug!(dependent = %dependent, failed = %failed, "Failure not propagated");
                return Ok(None);
            }
        };

        let lock = self.transition_lock(dependent);
        let _guard = lock.lock().await;

        let current = self.get_health(dependent);
        if status.severity() <= current.severity() {
            return Ok(None);
        }

        self.apply_status(dependent, status, &failure_reason(reason), Some(failed));
        info!(
            service = %dependent,
            source = %failed,
            previous = %current,
            %status,
            reason,
            "Cascaded health status"
        );

        if status == HealthStatus::Unhealthy {
            self.start_recovery(dependent);
        }
        Ok(Some(status))
    }

    /// Mark `dependent` healthy once every gating dependency, `recovered` included, is healthy enough.
    async fn propagate_recovery(&self, dependent: &str, recovered: &str) -> Result<bool> {
        if self.get_dependency(dependent, recovered).is_none() {
            return Err(MeshError::dependency_not_found(dependent, recovered));
        }

        let lock = self.transition_lock(dependent);
        let _guard = lock.lock().await;

        let current = self.get_health(dependent);
        if current == HealthStatus::Healthy {
            return Ok(false);
        }
        if !self.gating_dependencies_healthy(dependent) {
            debug!(service = %dependent, source = %recovered, "Service still gated by its dependencies");
            return Ok(false);
        }

        self.apply_status(
            dependent,
            HealthStatus::Healthy,
            &failure_reason(DEPENDENCIES_RECOVERED),
            Some(recovered),
        );
        self.stop_recovery(dependent);
        info!(
            service = %dependent,
            source = %recovered,
            previous = %current,
            "Service recovered with its dependencies"
        );
        Ok(true)
    }

    /// All CRITICAL and REQUIRED edges of `service_id` are healthy enough
    pub(crate) fn gating_dependencies_healthy(&self, service_id: &str) -> bool {
        self.edges
            .read()
            .dependencies
            .get(service_id)
            .map(|deps| {
                deps.values()
                    .filter(|edge| edge.dependency_type.gates_recovery())
                    .all(|edge| edge.is_satisfied())
            })
            .unwrap_or(true)
    }

    fn record_propagation_failure(&self, dependent: &str, source: &str, error: &MeshError) {
        self.propagation_failures.fetch_add(1, Ordering::Relaxed);
        warn!(
            service = %dependent,
            source = %source,
            code = error.error_code(),
            "Skipping dependent during propagation: {}",
            error
        );
    }
}
