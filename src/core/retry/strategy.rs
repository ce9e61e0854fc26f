//! Context-aware retry strategy
//!
//! Decides, for a failed call, whether to retry, back off, redirect to a fallback or fail
//! fast. The decision depends on the classified error, the method/priority retry budget and
//! a rolling window of recently seen error categories shared by every call routed through
//! the same strategy instance.

use super::classifier::ErrorClassifier;
use super::types::{ErrorCategory, RetryContext, RetryDecision, RetryOutcome, RetryPolicy};
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Snapshot of decision counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryClassifierStats {
    pub retries: u64,
    pub backoffs: u64,
    pub redirects: u64,
    pub fail_fasts: u64,
}

impl RetryClassifierStats {
    pub fn total(&self) -> u64 {
        self.retries + self.backoffs + self.redirects + self.fail_fasts
    }
}

#[derive(Debug, Default)]
struct DecisionCounters {
    retries: AtomicU64,
    backoffs: AtomicU64,
    redirects: AtomicU64,
    fail_fasts: AtomicU64,
}

impl DecisionCounters {
    fn record(&self, outcome: RetryOutcome) {
        let counter = match outcome {
            RetryOutcome::Retry => &self.retries,
            RetryOutcome::Backoff => &self.backoffs,
            RetryOutcome::Redirect => &self.redirects,
            RetryOutcome::FailFast => &self.fail_fasts,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> RetryClassifierStats {
        RetryClassifierStats {
            retries: self.retries.load(Ordering::Relaxed),
            backoffs: self.backoffs.load(Ordering::Relaxed),
            redirects: self.redirects.load(Ordering::Relaxed),
            fail_fasts: self.fail_fasts.load(Ordering::Relaxed),
        }
    }
}

/// Retry strategy driven by error category, call context and recent error history
#[derive(Debug)]
pub struct ContextAwareRetry {
    policy: RetryPolicy,
    error_history: Mutex<VecDeque<(Instant, ErrorCategory)>>,
    counters: DecisionCounters,
}

impl Default for ContextAwareRetry {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl ContextAwareRetry {
    /// Create a new strategy with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            error_history: Mutex::new(VecDeque::new()),
            counters: DecisionCounters::default(),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Decide whether a call should be retried, returning `(retry, delay)`.
    ///
    /// `REDIRECT` and `FAIL_FAST` both project to `(false, 0)`; use [`Self::decide`] to tell
    /// them apart.
    pub fn should_retry(&self, context: &RetryContext) -> (bool, Duration) {
        self.decide(context).should_retry()
    }

    /// Full retry decision for a failed call
    pub fn decide(&self, context: &RetryContext) -> RetryDecision {
        let category = ErrorClassifier::classify_context(context);
        let max_attempts = self.effective_max_attempts(context);

        let outcome = if context.attempt_number >= max_attempts
            || !self.policy.is_retryable(category)
        {
            RetryOutcome::FailFast
        } else {
            self.outcome_from_history(category)
        };

        let delay = if outcome.is_retry() {
            self.compute_delay(category, context.attempt_number)
        } else {
            Duration::ZERO
        };

        self.counters.record(outcome);
        debug!(
            method = %context.method,
            resource = %context.resource_path,
            attempt = context.attempt_number,
            max_attempts,
            %category,
            ?outcome,
            delay_ms = delay.as_millis() as u64,
            "Retry decision"
        );

        RetryDecision {
            outcome,
            delay,
            category,
            max_attempts,
        }
    }

    /// Attempt number at which a call sequence fails fast.
    ///
    /// Method and priority limits are retry budgets: a budget of `n` allows the original
    /// attempt plus `n` retries, so the sequence fails fast at attempt `n + 1`.
    pub fn effective_max_attempts(&self, context: &RetryContext) -> u32 {
        self.policy
            .retry_budget(&context.method, context.priority)
            .saturating_add(1)
    }

    /// Counts of each category currently inside the error window
    pub fn error_window_counts(&self) -> HashMap<ErrorCategory, usize> {
        let mut history = self.error_history.lock();
        prune_history(&mut history, Instant::now(), self.policy.error_window());

        let mut counts = HashMap::new();
        for (_, category) in history.iter() {
            *counts.entry(*category).or_insert(0) += 1;
        }
        counts
    }

    pub fn clear_history(&self) {
        self.error_history.lock().clear();
    }

    pub fn stats(&self) -> RetryClassifierStats {
        self.counters.snapshot()
    }

    fn outcome_from_history(&self, category: ErrorCategory) -> RetryOutcome {
        let now = Instant::now();
        let mut history = self.error_history.lock();
        history.push_back((now, category));
        prune_history(&mut history, now, self.policy.error_window());

        let count = |wanted: ErrorCategory| history.iter().filter(|(_, c)| *c == wanted).count();

        if count(ErrorCategory::RateLimit) >= self.policy.rate_limit_backoff_threshold {
            RetryOutcome::Backoff
        } else if count(ErrorCategory::ResourceExhausted)
            >= self.policy.resource_exhausted_redirect_threshold
        {
            RetryOutcome::Redirect
        } else {
            RetryOutcome::Retry
        }
    }

    fn compute_delay(&self, category: ErrorCategory, attempt_number: u32) -> Duration {
        let base = self.policy.base_delay_ms as f64 * category.delay_factor();
        let exponent = attempt_number.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay = (base * 2f64.powi(exponent)).min(self.policy.max_delay_ms as f64);

        let jitter_factor = self.policy.jitter_factor.abs();
        let jitter = if jitter_factor > 0.0 {
            delay * rand::thread_rng().gen_range(-jitter_factor..=jitter_factor)
        } else {
            0.0
        };

        Duration::from_micros(((delay + jitter).max(0.0) * 1000.0).round() as u64)
    }
}

fn prune_history(history: &mut VecDeque<(Instant, ErrorCategory)>, now: Instant, window: Duration) {
    while let Some((timestamp, _)) = history.front() {
        if now.saturating_duration_since(*timestamp) > window {
            history.pop_front();
        } else {
            break;
        }
    }
}
