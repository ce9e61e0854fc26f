//! Custom test assertions

use mesh_resilience::{DependencyHealthGraph, HealthStatus};

/// Assert a duration lies in `[min_ms, max_ms]`
#[macro_export]
macro_rules! assert_duration_between {
    ($duration:expr, $min_ms:expr, $max_ms:expr) => {
        let millis = $duration.as_secs_f64() * 1000.0;
        assert!(
            millis >= $min_ms as f64 && millis <= $max_ms as f64,
            "expected duration in [{}ms, {}ms], got {:.3}ms",
            $min_ms,
            $max_ms,
            millis
        );
    };
}

/// Assertions over a graph's statuses
pub trait GraphAssertions {
    fn assert_status(&self, service: &str, expected: HealthStatus);
}

impl GraphAssertions for DependencyHealthGraph {
    fn assert_status(&self, service: &str, expected: HealthStatus) {
        let actual = self.get_health(service);
        assert_eq!(
            actual, expected,
            "expected {} to be {}, found {}",
            service, expected, actual
        );
    }
}
