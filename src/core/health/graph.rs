//! Dependency health graph
//!
//! This module provides the graph structure itself: directed `service -> dependency`
//! edges, the reverse index used for fan-out, per-service cached status and the handles of
//! every background task the graph owns.

use super::types::{
    DependencyInfo, DependencyType, FailureInfo, GraphConfig, HealthEvent, HealthStatus,
};
use crate::utils::error::{MeshError, Result};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Forward and reverse edge maps, always mutated together
#[derive(Debug, Default)]
pub(crate) struct EdgeIndex {
    /// `service -> dependency -> edge`
    pub(crate) dependencies: HashMap<String, HashMap<String, DependencyInfo>>,
    /// `dependency -> services depending on it`
    pub(crate) dependents: HashMap<String, HashSet<String>>,
}

/// Node-local dependency health graph.
///
/// Cloning is cheap and yields another handle to the same graph; background tasks hold
/// such handles. Call [`DependencyHealthGraph::shutdown`] to stop them.
#[derive(Debug, Clone)]
pub struct DependencyHealthGraph {
    pub(crate) config: GraphConfig,
    pub(crate) edges: Arc<RwLock<EdgeIndex>>,
    pub(crate) health: Arc<DashMap<String, HealthStatus>>,
    /// Per-service FIFO locks that serialize status transitions
    pub(crate) transition_locks: Arc<DashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    pub(crate) recovery_tasks: Arc<DashMap<String, JoinHandle<()>>>,
    pub(crate) check_tasks: Arc<DashMap<String, JoinHandle<()>>>,
    pub(crate) cascade_tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
    pub(crate) events: Arc<RwLock<VecDeque<HealthEvent>>>,
    pub(crate) propagation_failures: Arc<AtomicU64>,
    pub(crate) shut_down: Arc<AtomicBool>,
}

impl Default for DependencyHealthGraph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl DependencyHealthGraph {
    /// Create an empty graph
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            edges: Arc::new(RwLock::new(EdgeIndex::default())),
            health: Arc::new(DashMap::new()),
            transition_locks: Arc::new(DashMap::new()),
            recovery_tasks: Arc::new(DashMap::new()),
            check_tasks: Arc::new(DashMap::new()),
            cascade_tasks: Arc::new(Mutex::new(Vec::new())),
            events: Arc::new(RwLock::new(VecDeque::new())),
            propagation_failures: Arc::new(AtomicU64::new(0)),
            shut_down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Add (or replace) the edge `service_id -> dependency_id`
    pub fn add_dependency(
        &self,
        service_id: &str,
        dependency_id: &str,
        dependency_type: DependencyType,
        impact_score: f64,
    ) -> Result<()> {
        if service_id == dependency_id {
            return Err(MeshError::SelfDependency(service_id.to_string()));
        }
        if !impact_score.is_finite() || !(0.0..=1.0).contains(&impact_score) {
            return Err(MeshError::InvalidImpactScore(impact_score));
        }

        self.register_service(service_id);
        self.register_service(dependency_id);

        {
            // Read under the write guard so a concurrent transition is mirrored onto the edge
            let mut edges = self.edges.write();
            let dependency_status = self.get_health(dependency_id);
            edges
                .dependencies
                .entry(service_id.to_string())
                .or_default()
                .insert(
                    dependency_id.to_string(),
                    DependencyInfo::new(dependency_type, impact_score, dependency_status),
                );
            edges
                .dependents
                .entry(dependency_id.to_string())
                .or_default()
                .insert(service_id.to_string());
        }

        info!(
            service = %service_id,
            dependency = %dependency_id,
            dependency_type = ?dependency_type,
            impact_score,
            "Added dependency"
        );
        Ok(())
    }

    /// Remove the edge `service_id -> dependency_id`
    pub fn remove_dependency(&self, service_id: &str, dependency_id: &str) -> Result<()> {
        let mut edges = self.edges.write();

        let removed = edges
            .dependencies
            .get_mut(service_id)
            .and_then(|deps| deps.remove(dependency_id));
        if removed.is_none() {
            return Err(MeshError::dependency_not_found(service_id, dependency_id));
        }
        if edges
            .dependencies
            .get(service_id)
            .is_some_and(|deps| deps.is_empty())
        {
            edges.dependencies.remove(service_id);
        }

        if let Some(services) = edges.dependents.get_mut(dependency_id) {
            services.remove(service_id);
            if services.is_empty() {
                edges.dependents.remove(dependency_id);
            }
        }
        drop(edges);

        info!(service = %service_id, dependency = %dependency_id, "Removed dependency");
        Ok(())
    }

    /// Whether `dependency_id` is healthy enough for `service_id`'s edge to it.
    ///
    /// Unknown edges are never healthy enough.
    pub fn check_dependency_health(&self, service_id: &str, dependency_id: &str) -> bool {
        self.edges
            .read()
            .dependencies
            .get(service_id)
            .and_then(|deps| deps.get(dependency_id))
            .is_some_and(DependencyInfo::is_satisfied)
    }

    /// Cached status of each dependency of `service_id`
    pub fn get_dependency_status(&self, service_id: &str) -> HashMap<String, HealthStatus> {
        self.edges
            .read()
            .dependencies
            .get(service_id)
            .map(|deps| {
                deps.iter()
                    .map(|(id, info)| (id.clone(), info.health_status))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Current status of a service; unseen services are `Unknown`
    pub fn get_health(&self, service_id: &str) -> HealthStatus {
        self.health
            .get(service_id)
            .map(|status| *status)
            .unwrap_or(HealthStatus::Unknown)
    }

    /// Edge record for `service_id -> dependency_id`
    pub fn get_dependency(&self, service_id: &str, dependency_id: &str) -> Option<DependencyInfo> {
        self.edges
            .read()
            .dependencies
            .get(service_id)
            .and_then(|deps| deps.get(dependency_id))
            .cloned()
    }

    /// Services that depend directly on `service_id`
    pub fn dependents_of(&self, service_id: &str) -> Vec<String> {
        self.edges
            .read()
            .dependents
            .get(service_id)
            .map(|services| services.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Services `service_id` depends on directly
    pub fn dependencies_of(&self, service_id: &str) -> Vec<String> {
        self.edges
            .read()
            .dependencies
            .get(service_id)
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Recorded status transitions, oldest first
    pub fn event_history(&self) -> Vec<HealthEvent> {
        self.events.read().iter().cloned().collect()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Stop every background task owned by the graph
    pub async fn shutdown(&self) {
        info!("Shutting down dependency health graph");
        let cascades: Vec<_> = {
            let mut tasks = self.cascade_tasks.lock();
            self.shut_down.store(true, Ordering::Release);
            tasks.drain(..).collect()
        };
        let recoveries = drain_tasks(&self.recovery_tasks);
        let checks = drain_tasks(&self.check_tasks);

        let total = cascades.len() + recoveries.len() + checks.len();
        for task in cascades.into_iter().chain(recoveries).chain(checks) {
            task.abort();
            let _ = task.await;
        }

        info!(tasks = total, "Dependency health graph shutdown complete");
    }

    pub(crate) fn register_service(&self, service_id: &str) {
        self.health
            .entry(service_id.to_string())
            .or_insert(HealthStatus::Unknown);
    }

    pub(crate) fn transition_lock(&self, service_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.transition_locks
            .entry(service_id.to_string())
            .or_default()
            .clone()
    }

    /// Set a service's status and mirror it onto every edge pointing at the service.
    ///
    /// Callers hold the service's transition lock. Returns the previous status.
    pub(crate) fn apply_status(
        &self,
        service_id: &str,
        status: HealthStatus,
        info: &FailureInfo,
        source: Option<&str>,
    ) -> HealthStatus {
        let previous = self
            .health
            .insert(service_id.to_string(), status)
            .unwrap_or(HealthStatus::Unknown);

        {
            let mut edges = self.edges.write();
            let EdgeIndex {
                dependencies,
                dependents,
            } = &mut *edges;
            if let Some(services) = dependents.get(service_id) {
                for service in services {
                    if let Some(edge) = dependencies
                        .get_mut(service)
                        .and_then(|deps| deps.get_mut(service_id))
                    {
                        edge.observe_status(status);
                    }
                }
            }
        }

        if previous != status {
            self.record_event(HealthEvent {
                timestamp: chrono::Utc::now(),
                service: service_id.to_string(),
                previous,
                status,
                reason: info.get("reason").cloned(),
                source: source.map(str::to_string),
            });
        } else {
            debug!(service = %service_id, %status, "Health status unchanged");
        }

        previous
    }

    fn record_event(&self, event: HealthEvent) {
        let mut events = self.events.write();
        events.push_back(event);
        while events.len() > self.config.history_size.max(1) {
            events.pop_front();
        }
    }
}

fn drain_tasks(tasks: &DashMap<String, JoinHandle<()>>) -> Vec<JoinHandle<()>> {
    let keys: Vec<String> = tasks.iter().map(|entry| entry.key().clone()).collect();
    keys.into_iter()
        .filter_map(|key| tasks.remove(&key).map(|(_, task)| task))
        .collect()
}
