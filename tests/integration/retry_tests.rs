//! Retry classification integration tests

#[cfg(test)]
mod tests {
    use crate::assert_duration_between;
    use crate::common::fixed_retry_policy;
    use mesh_resilience::{
        ContextAwareRetry, ErrorCategory, ErrorClassifier, Priority, RetryContext, RetryOutcome,
        RetryPolicy,
    };
    use std::collections::HashSet;
    use std::time::Duration;

    #[test]
    fn test_delete_retry_budget() {
        let retry = ContextAwareRetry::new(fixed_retry_policy());

        let first = RetryContext::new("TimeoutError", "upstream timed out")
            .with_method("DELETE")
            .with_attempt(1);
        let decision = retry.decide(&first);
        assert_eq!(decision.category, ErrorCategory::Timeout);
        assert_eq!(decision.outcome, RetryOutcome::Retry);
        assert_eq!(decision.max_attempts, 2);

        let second = first.clone().with_attempt(2);
        assert_eq!(retry.decide(&second).outcome, RetryOutcome::FailFast);
        assert_eq!(retry.should_retry(&second), (false, Duration::ZERO));
    }

    #[test]
    fn test_non_retryable_categories_never_retry() {
        let retry = ContextAwareRetry::new(RetryPolicy::default());
        let contexts = [
            RetryContext::new("ValueError", "bad field"),
            RetryContext::new("RuntimeError", "segfault in handler"),
            RetryContext::new("Mystery", "something odd happened"),
            RetryContext::new("", ""),
        ];

        for context in &contexts {
            for attempt in 1..=3 {
                let context = context.clone().with_attempt(attempt);
                assert_eq!(retry.should_retry(&context), (false, Duration::ZERO));
            }
        }
    }

    #[test]
    fn test_attempt_bound_invariant() {
        let retry = ContextAwareRetry::new(RetryPolicy::default());

        for method in ["GET", "POST", "PUT", "DELETE", "PATCH"] {
            for priority in [None, Some(Priority::High), Some(Priority::Low)] {
                let mut context = RetryContext::new("ConnectionRefused", "").with_method(method);
                if let Some(priority) = priority {
                    context = context.with_priority(priority);
                }
                let max = retry.effective_max_attempts(&context);
                for attempt in max..max + 3 {
                    let (should_retry, delay) =
                        retry.should_retry(&context.clone().with_attempt(attempt));
                    assert!(!should_retry, "{} attempt {} retried", method, attempt);
                    assert_eq!(delay, Duration::ZERO);
                }
            }
        }
    }

    #[test]
    fn test_high_priority_extends_budget() {
        let retry = ContextAwareRetry::new(fixed_retry_policy());
        let context = RetryContext::new("TimedOut", "")
            .with_method("POST")
            .with_attempt(4);

        assert!(!retry.should_retry(&context).0);
        assert!(retry.should_retry(&context.with_priority(Priority::High)).0);
    }

    #[test]
    fn test_delay_grows_and_is_capped() {
        let policy = RetryPolicy {
            max_delay_ms: 500,
            ..fixed_retry_policy()
        };
        let retry = ContextAwareRetry::new(policy);
        let context = RetryContext::new("TimedOut", "")
            .with_method("GET")
            .with_priority(Priority::High);

        let delays: Vec<Duration> = (1..=5)
            .map(|attempt| retry.should_retry(&context.clone().with_attempt(attempt)).1)
            .collect();

        assert_eq!(delays[0], Duration::from_millis(100));
        assert_eq!(delays[1], Duration::from_millis(200));
        assert_eq!(delays[2], Duration::from_millis(400));
        assert_eq!(delays[3], Duration::from_millis(500));
        assert_eq!(delays[4], Duration::from_millis(500));
    }

    #[test]
    fn test_jittered_delay_stays_near_base() {
        let retry = ContextAwareRetry::new(RetryPolicy::default());
        let context = RetryContext::new("TimedOut", "");

        for _ in 0..50 {
            let (_, delay) = retry.should_retry(&context);
            assert_duration_between!(delay, 90, 110);
        }
    }

    #[test]
    fn test_rate_limit_escalates_to_backoff() {
        let retry = ContextAwareRetry::new(fixed_retry_policy());
        let context = RetryContext::new("HTTPError", "429 Too Many Requests");

        let outcomes: Vec<_> = (0..4).map(|_| retry.decide(&context).outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                RetryOutcome::Retry,
                RetryOutcome::Retry,
                RetryOutcome::Backoff,
                RetryOutcome::Backoff
            ]
        );

        let decision = retry.decide(&context);
        assert_eq!(decision.delay, Duration::from_millis(200));
        assert!(decision.should_retry().0);
    }

    #[test]
    fn test_resource_exhaustion_redirects() {
        let retry = ContextAwareRetry::new(fixed_retry_policy());
        let context = RetryContext::new("MemoryError", "worker ran out of memory");

        assert_eq!(retry.decide(&context).outcome, RetryOutcome::Retry);
        let second = retry.decide(&context);
        assert_eq!(second.outcome, RetryOutcome::Redirect);
        assert_eq!(second.should_retry(), (false, Duration::ZERO));

        let stats = retry.stats();
        assert_eq!(stats.retries, 1);
        assert_eq!(stats.redirects, 1);
        assert_eq!(stats.total(), 2);
    }

    #[test]
    fn test_custom_retryable_set() {
        let policy = RetryPolicy {
            retryable_categories: HashSet::from([ErrorCategory::InternalError]),
            ..fixed_retry_policy()
        };
        let retry = ContextAwareRetry::new(policy);

        assert!(retry.should_retry(&RetryContext::new("RuntimeError", "")).0);
        assert!(!retry.should_retry(&RetryContext::new("TimedOut", "")).0);
    }

    #[test]
    fn test_io_errors_classify_by_kind() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "deadline");

        assert_eq!(
            ErrorClassifier::classify_io(&refused),
            ErrorCategory::NetworkError
        );
        assert_eq!(ErrorClassifier::classify_io(&timeout), ErrorCategory::Timeout);

        let retry = ContextAwareRetry::new(fixed_retry_policy());
        assert!(retry.should_retry(&RetryContext::from_io_error(&timeout)).0);
    }
}
