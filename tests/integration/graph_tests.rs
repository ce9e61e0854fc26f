//! Dependency health graph integration tests
//!
//! Exercises cascades, recovery gating and the graph lifecycle through the public API.

#[cfg(test)]
mod tests {
    use crate::common::assertions::GraphAssertions;
    use crate::common::{GraphFixture, fast_graph_config};
    use mesh_resilience::DependencyType::{Critical, Optional, Required};
    use mesh_resilience::{DependencyHealthGraph, HealthStatus};
    use std::time::Duration;

    /// `A` critically depends on `B`, `C` only optionally
    #[tokio::test]
    async fn test_cascade_containment() {
        let fixture = GraphFixture::with_edges(&[("A", "B", Critical), ("C", "B", Optional)]);
        fixture
            .report_all(&["A", "B", "C"], HealthStatus::Healthy)
            .await;

        fixture.report("B", HealthStatus::Unhealthy).await;

        fixture.graph.assert_status("A", HealthStatus::Unhealthy);
        fixture.graph.assert_status("C", HealthStatus::Healthy);
        fixture.finish().await;
    }

    #[tokio::test]
    async fn test_recovery_gating() {
        let fixture = GraphFixture::with_edges(&[("A", "B", Critical), ("A", "D", Required)]);
        fixture
            .report_all(&["B", "D", "A"], HealthStatus::Healthy)
            .await;
        fixture
            .report_all(&["B", "D"], HealthStatus::Unhealthy)
            .await;
        fixture.graph.assert_status("A", HealthStatus::Unhealthy);

        fixture.report("B", HealthStatus::Healthy).await;
        fixture.graph.assert_status("A", HealthStatus::Unhealthy);

        fixture.report("D", HealthStatus::Degraded).await;
        fixture.graph.assert_status("A", HealthStatus::Unhealthy);

        // A DEGRADED required dependency does not hold recovery back, but nothing
        // re-evaluates A until one of its dependencies becomes healthy
        fixture.report("D", HealthStatus::Healthy).await;
        fixture.graph.assert_status("A", HealthStatus::Healthy);
        fixture.finish().await;
    }

    #[tokio::test]
    async fn test_checkout_inventory_example() {
        let fixture = GraphFixture::new();
        fixture
            .graph
            .add_dependency("checkout", "inventory", Critical, 1.0)
            .unwrap();

        fixture.report("inventory", HealthStatus::Unhealthy).await;

        let statuses = fixture.graph.get_dependency_status("checkout");
        assert_eq!(statuses["inventory"], HealthStatus::Unhealthy);
        fixture
            .graph
            .assert_status("checkout", HealthStatus::Unhealthy);
        fixture.finish().await;
    }

    #[tokio::test]
    async fn test_diamond_topology() {
        let fixture = GraphFixture::with_edges(&[
            ("top", "left", Critical),
            ("top", "right", Critical),
            ("left", "bottom", Critical),
            ("right", "bottom", Required),
        ]);
        fixture
            .report_all(&["bottom", "left", "right", "top"], HealthStatus::Healthy)
            .await;

        fixture.report("bottom", HealthStatus::Unhealthy).await;
        assert_eq!(fixture.status("left"), HealthStatus::Unhealthy);
        assert_eq!(fixture.status("right"), HealthStatus::Degraded);
        assert_eq!(fixture.status("top"), HealthStatus::Unhealthy);

        fixture.report("bottom", HealthStatus::Healthy).await;
        for service in ["left", "right", "top"] {
            fixture.graph.assert_status(service, HealthStatus::Healthy);
        }
        assert!(fixture.graph.recovering_services().is_empty());
        fixture.finish().await;
    }

    #[tokio::test]
    async fn test_three_node_cycle() {
        let fixture = GraphFixture::with_edges(&[
            ("a", "b", Critical),
            ("b", "c", Critical),
            ("c", "a", Critical),
        ]);
        fixture
            .report_all(&["a", "b", "c"], HealthStatus::Healthy)
            .await;

        fixture.report("c", HealthStatus::Unhealthy).await;
        for service in ["a", "b", "c"] {
            fixture.graph.assert_status(service, HealthStatus::Unhealthy);
        }

        fixture.report("c", HealthStatus::Healthy).await;
        for service in ["a", "b", "c"] {
            fixture.graph.assert_status(service, HealthStatus::Healthy);
        }
        fixture.finish().await;
    }

    #[tokio::test]
    async fn test_concurrent_reports_on_independent_services() {
        let fixture = GraphFixture::new();
        for i in 0..16 {
            fixture
                .graph
                .add_dependency(&format!("api-{}", i), &format!("db-{}", i), Critical, 1.0)
                .unwrap();
        }

        let mut handles = Vec::new();
        for i in 0..16 {
            let graph = fixture.graph.clone();
            handles.push(tokio::spawn(async move {
                graph
                    .update_health(&format!("db-{}", i), HealthStatus::Unhealthy, None)
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        fixture.settle().await;

        let metrics = fixture.graph.get_metrics();
        assert_eq!(metrics.count(HealthStatus::Unhealthy), 32);
        assert_eq!(metrics.active_recovery_loops, 32);
        fixture.finish().await;
    }

    #[tokio::test]
    async fn test_reports_for_one_service_apply_in_order() {
        let fixture = GraphFixture::new();
        for status in [
            HealthStatus::Healthy,
            HealthStatus::Unhealthy,
            HealthStatus::Degraded,
            HealthStatus::Healthy,
        ] {
            fixture.graph.update_health("svc", status, None).await;
        }

        let transitions: Vec<_> = fixture
            .graph
            .event_history()
            .into_iter()
            .map(|event| event.status)
            .collect();
        assert_eq!(
            transitions,
            vec![
                HealthStatus::Healthy,
                HealthStatus::Unhealthy,
                HealthStatus::Degraded,
                HealthStatus::Healthy,
            ]
        );
        assert!(!fixture.graph.is_recovering("svc"));
        fixture.finish().await;
    }

    #[tokio::test]
    async fn test_shutdown_cancels_pending_cascade() {
        let graph = DependencyHealthGraph::new(mesh_resilience::GraphConfig {
            cascade_delay_ms: 30_000,
            ..fast_graph_config()
        });
        graph.add_dependency("api", "db", Critical, 1.0).unwrap();
        graph.update_health("api", HealthStatus::Healthy, None).await;
        graph.update_health("db", HealthStatus::Unhealthy, None).await;

        tokio::time::timeout(Duration::from_secs(5), graph.shutdown())
            .await
            .expect("shutdown hung");

        graph.assert_status("api", HealthStatus::Healthy);
        assert!(graph.recovering_services().is_empty());
    }

    #[tokio::test]
    async fn test_metrics_serialize_to_json() {
        let fixture = GraphFixture::with_edges(&[("web", "api", Critical)]);
        fixture.report("api", HealthStatus::Unhealthy).await;

        let json = serde_json::to_value(fixture.graph.get_metrics()).unwrap();
        assert_eq!(json["total_edges"], 1);
        assert_eq!(json["services"]["web"]["status"], "UNHEALTHY");
        assert_eq!(json["health_summary"]["HEALTHY"], 0);
        assert!(json["pattern_history"].as_array().unwrap().len() >= 2);
        fixture.finish().await;
    }
}
