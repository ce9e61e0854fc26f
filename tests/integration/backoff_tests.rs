//! Adaptive backoff integration tests

#[cfg(test)]
mod tests {
    use crate::assert_duration_between;
    use crate::common::fixed_backoff_config;
    use mesh_resilience::{AdaptiveBackoff, BackoffConfig, BackoffStrategy, StrategyScores};
    use std::time::Duration;

    #[test]
    fn test_cold_start_uses_initial_delay() {
        let engine = AdaptiveBackoff::new(fixed_backoff_config());

        assert_eq!(
            engine.select_strategy_for("orders", None),
            BackoffStrategy::Exponential
        );
        assert_eq!(engine.get_delay("orders", None), Duration::from_secs(1));

        let state = engine.state_snapshot("orders").unwrap();
        assert_eq!(state.attempt, 1);
        assert_eq!(state.last_strategy, Some(BackoffStrategy::Exponential));
    }

    #[test]
    fn test_delay_always_within_bounds() {
        let config = BackoffConfig {
            max_delay_secs: 5.0,
            jitter: 0.5,
            ..Default::default()
        };
        let engine = AdaptiveBackoff::new(config);
        let samples = [None, Some(0.2), Some(0.99), Some(f64::NAN), Some(7.5), Some(-1.0)];

        for i in 0..200 {
            let delay = engine.get_delay("bounded", samples[i % samples.len()]);
            assert!(delay <= Duration::from_secs(5), "delay {:?} above max", delay);
            engine.record_attempt("bounded", i % 3 == 0);
        }
    }

    #[test]
    fn test_high_resource_pressure_forces_resource_strategy() {
        let engine = AdaptiveBackoff::new(fixed_backoff_config());
        engine.get_delay("db", None);

        assert_eq!(
            engine.select_strategy_for("db", Some(0.95)),
            BackoffStrategy::ResourceSensitive
        );
        let delay = engine.get_delay("db", Some(0.95));
        // Second attempt: 2s of exponential growth scaled by 1.95
        assert_duration_between!(delay, 3899, 3901);
    }

    #[test]
    fn test_alternating_outcomes_select_pattern_strategy() {
        let engine = AdaptiveBackoff::new(fixed_backoff_config());
        for i in 0..8 {
            engine.get_delay("flappy", None);
            engine.record_attempt("flappy", i % 2 == 0);
        }

        assert_eq!(
            engine.select_strategy_for("flappy", None),
            BackoffStrategy::PatternBased
        );
        let delay = engine.get_delay("flappy", None);
        assert!(delay <= Duration::from_secs(60));
    }

    #[test]
    fn test_failures_lower_effectiveness() {
        let engine = AdaptiveBackoff::new(fixed_backoff_config());
        engine.get_delay("api", None);
        engine.record_attempt("api", false);

        let scores = engine.effectiveness_scores();
        assert!((scores[&BackoffStrategy::Exponential] - 0.5).abs() < 1e-9);
        assert_eq!(scores[&BackoffStrategy::Fibonacci], 1.0);
        assert_eq!(
            engine.select_strategy_for("api", None),
            BackoffStrategy::Fibonacci
        );
    }

    #[test]
    fn test_engines_can_share_effectiveness() {
        let scores = StrategyScores::new();
        let first = AdaptiveBackoff::with_scores(fixed_backoff_config(), scores.clone());
        let second = AdaptiveBackoff::with_scores(fixed_backoff_config(), scores.clone());

        first.get_delay("a", None);
        first.record_attempt("a", false);

        assert!(second.effectiveness_scores()[&BackoffStrategy::Exponential] < 1.0);
        assert!(scores.get(BackoffStrategy::Exponential) < 1.0);
    }

    #[test]
    fn test_keys_are_independent() {
        let engine = AdaptiveBackoff::new(fixed_backoff_config());
        for _ in 0..4 {
            engine.get_delay("busy", None);
        }

        assert_eq!(engine.get_delay("fresh", None), Duration::from_secs(1));
        assert_eq!(engine.state_snapshot("busy").unwrap().attempt, 4);

        let mut keys = engine.tracked_keys();
        keys.sort();
        assert_eq!(keys, vec!["busy".to_string(), "fresh".to_string()]);

        engine.reset("busy");
        assert_eq!(engine.state_snapshot("busy").unwrap().attempt, 0);
        assert!(engine.remove("busy"));
        assert!(engine.state_snapshot("busy").is_none());
    }

    #[test]
    fn test_concurrent_delays_for_one_key() {
        let engine = AdaptiveBackoff::new(fixed_backoff_config());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for i in 0..50 {
                        engine.get_delay("shared", Some(0.3));
                        engine.record_attempt("shared", i % 4 != 0);
                    }
                });
            }
        });

        let state = engine.state_snapshot("shared").unwrap();
        assert_eq!(state.attempt, 400);
        assert_eq!(state.success_count + state.failure_count, 400);
        assert_eq!(state.failure_count, 8 * 13);
    }
}
