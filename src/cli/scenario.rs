//! Replayable dependency graph scenarios

use anyhow::Context;
use mesh_resilience::{DependencyHealthGraph, DependencyType, GraphMetrics, HealthStatus};
use mesh_resilience::core::health::failure_reason;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// A graph plus a timed list of status reports
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub dependencies: Vec<ScenarioEdge>,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioEdge {
    pub service: String,
    pub dependency: String,
    #[serde(rename = "type")]
    pub dependency_type: DependencyType,
    #[serde(default = "default_impact")]
    pub impact: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioEvent {
    pub service: String,
    pub status: HealthStatus,
    /// Wait before this event, relative to the previous one
    #[serde(default)]
    pub after_ms: u64,
    #[serde(default)]
    pub reason: Option<String>,
}

fn default_impact() -> f64 {
    1.0
}

impl Scenario {
    pub async fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read scenario file {:?}", path))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse scenario")
    }

    /// Build the graph, replay every event and return the settled metrics
    pub async fn run(&self, graph: &DependencyHealthGraph) -> anyhow::Result<GraphMetrics> {
        for edge in &self.dependencies {
            graph
                .add_dependency(
                    &edge.service,
                    &edge.dependency,
                    edge.dependency_type,
                    edge.impact,
                )
                .with_context(|| {
                    format!("Invalid dependency {} -> {}", edge.service, edge.dependency)
                })?;
        }

        for event in &self.events {
            if event.after_ms > 0 {
                tokio::time::sleep(Duration::from_millis(event.after_ms)).await;
            }
            info!(service = %event.service, status = %event.status, "Replaying event");
            graph
                .update_health(
                    &event.service,
                    event.status,
                    event.reason.as_deref().map(failure_reason),
                )
                .await;
        }

        graph.wait_for_cascades().await;
        Ok(graph.get_metrics())
    }
}
