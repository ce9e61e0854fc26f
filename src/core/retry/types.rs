//! Retry classification types
//!
//! This module defines the error taxonomy, the per-call retry context built by the
//! transport layer and the policy that drives retry decisions.

use crate::config::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Category a failed call is classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// The call did not complete in time
    Timeout,
    /// The remote side is throttling us
    RateLimit,
    /// The remote side ran out of capacity (memory, quota, connections)
    ResourceExhausted,
    /// The request itself is malformed; retrying will not help
    InvalidRequest,
    /// Generic failure inside the remote service
    InternalError,
    /// Connection-level failure
    NetworkError,
    /// Nothing matched
    Unknown,
}

impl ErrorCategory {
    /// Backoff multiplier applied to the policy base delay for this category
    pub fn delay_factor(&self) -> f64 {
        match self {
            ErrorCategory::RateLimit => 2.0,
            ErrorCategory::ResourceExhausted => 3.0,
            _ => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::RateLimit => "rate_limit",
            ErrorCategory::ResourceExhausted => "resource_exhausted",
            ErrorCategory::InvalidRequest => "invalid_request",
            ErrorCategory::InternalError => "internal_error",
            ErrorCategory::NetworkError => "network_error",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request priority tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// What the caller should do with a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetryOutcome {
    /// Retry the same target after the returned delay
    Retry,
    /// Give up immediately
    FailFast,
    /// Retry the same target, but the target is being throttled; wait longer
    Backoff,
    /// Do not retry this target; route to a fallback instead
    Redirect,
}

impl RetryOutcome {
    /// Whether the caller should issue another attempt against the same target
    pub fn is_retry(&self) -> bool {
        matches!(self, RetryOutcome::Retry | RetryOutcome::Backoff)
    }
}

/// Context of a single failed call, built fresh for every decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryContext {
    /// Error type name, e.g. `TimedOut` or `ConnectionRefused`
    pub error_type: String,
    /// Error message as raised by the transport
    pub error_message: String,
    /// 1-based number of the attempt that just failed
    pub attempt_number: u32,
    /// Time spent on the call sequence so far
    pub elapsed: Duration,
    /// Resource path the call targeted
    pub resource_path: String,
    /// HTTP-like method
    pub method: String,
    /// Optional priority tag
    pub priority: Option<Priority>,
    /// Free-form metadata from the transport
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RetryContext {
    /// Create a context for the first failed attempt of a GET call
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            error_message: error_message.into(),
            attempt_number: 1,
            elapsed: Duration::ZERO,
            resource_path: String::new(),
            method: "GET".to_string(),
            priority: None,
            metadata: HashMap::new(),
        }
    }

    /// Build a context from an IO error, using the error kind as the type name
    pub fn from_io_error(error: &std::io::Error) -> Self {
        Self::new(format!("{:?}", error.kind()), error.to_string())
    }

    pub fn with_attempt(mut self, attempt_number: u32) -> Self {
        self.attempt_number = attempt_number;
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_resource_path(mut self, resource_path: impl Into<String>) -> Self {
        self.resource_path = resource_path.into();
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Result of a retry decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryDecision {
    /// What to do
    pub outcome: RetryOutcome,
    /// How long to wait before the next attempt (zero unless retrying)
    pub delay: Duration,
    /// Category the error was classified into
    pub category: ErrorCategory,
    /// Attempt number at which the call sequence fails fast
    pub max_attempts: u32,
}

impl RetryDecision {
    /// Project the decision onto the `(retry, delay)` pair
    pub fn should_retry(&self) -> (bool, Duration) {
        if self.outcome.is_retry() {
            (true, self.delay)
        } else {
            (false, Duration::ZERO)
        }
    }
}

/// Retry policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retry budget for methods without a specific limit
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay (milliseconds)
    #[serde(default = "default_retry_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Maximum delay (milliseconds)
    #[serde(default = "default_retry_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Relative jitter applied to every delay
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
    /// Categories that may be retried
    #[serde(default = "default_retryable_categories")]
    pub retryable_categories: HashSet<ErrorCategory>,
    /// Trailing window of the error history (seconds)
    #[serde(default = "default_error_window_secs")]
    pub error_window_secs: u64,
    /// Per-method retry budgets, keyed by uppercase method
    #[serde(default = "default_method_limits", with = "method_limits_serde")]
    pub method_limits: HashMap<String, u32>,
    /// Per-priority retry budgets
    #[serde(default = "default_priority_limits")]
    pub priority_limits: HashMap<Priority, u32>,
    /// Rate-limit errors in the window that switch RETRY to BACKOFF
    #[serde(default = "default_rate_limit_backoff_threshold")]
    pub rate_limit_backoff_threshold: usize,
    /// Resource-exhausted errors in the window that switch RETRY to REDIRECT
    #[serde(default = "default_resource_exhausted_redirect_threshold")]
    pub resource_exhausted_redirect_threshold: usize,
}

// Method keys are matched uppercase, so `get: 3` in YAML applies to GET requests
mod method_limits_serde {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<S>(limits: &HashMap<String, u32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        limits.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<HashMap<String, u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = HashMap::<String, u32>::deserialize(deserializer)?;
        let mut limits = HashMap::with_capacity(raw.len());
        for (method, limit) in raw {
            let key = method.trim().to_uppercase();
            if limits.insert(key.clone(), limit).is_some() {
                return Err(D::Error::custom(format!("duplicate method limit for {}", key)));
            }
        }
        Ok(limits)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_retry_base_delay_ms(),
            max_delay_ms: default_retry_max_delay_ms(),
            jitter_factor: default_jitter_factor(),
            retryable_categories: default_retryable_categories(),
            error_window_secs: default_error_window_secs(),
            method_limits: default_method_limits(),
            priority_limits: default_priority_limits(),
            rate_limit_backoff_threshold: default_rate_limit_backoff_threshold(),
            resource_exhausted_redirect_threshold: default_resource_exhausted_redirect_threshold(),
        }
    }
}

impl RetryPolicy {
    pub fn error_window(&self) -> Duration {
        Duration::from_secs(self.error_window_secs)
    }

    pub fn is_retryable(&self, category: ErrorCategory) -> bool {
        self.retryable_categories.contains(&category)
    }

    /// Retry budget for a method and optional priority; the larger of the two wins
    pub fn retry_budget(&self, method: &str, priority: Option<Priority>) -> u32 {
        let method_limit = self
            .method_limits
            .get(&method.to_uppercase())
            .copied()
            .unwrap_or(self.max_attempts);

        let priority_limit = priority
            .and_then(|p| self.priority_limits.get(&p).copied())
            .unwrap_or(0);

        method_limit.max(priority_limit)
    }
}
