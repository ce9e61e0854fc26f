//! Default value functions for configuration

use crate::core::retry::types::{ErrorCategory, Priority};
use crate::utils::logging::LogFormat;
use std::collections::{HashMap, HashSet};

// ==================== Dependency graph ====================

pub fn default_cascade_delay_ms() -> u64 {
    1000
}

pub fn default_initial_recovery_interval_ms() -> u64 {
    1000
}

pub fn default_max_retry_interval_secs() -> u64 {
    300
}

pub fn default_health_check_interval_secs() -> u64 {
    30
}

pub fn default_event_history_size() -> usize {
    1000
}

// ==================== Adaptive backoff ====================

pub fn default_initial_delay_secs() -> f64 {
    1.0
}

pub fn default_max_delay_secs() -> f64 {
    60.0
}

pub fn default_multiplier() -> f64 {
    2.0
}

pub fn default_jitter() -> f64 {
    0.1
}

pub fn default_resource_threshold() -> f64 {
    0.8
}

pub fn default_backoff_history_size() -> usize {
    100
}

pub fn default_min_pattern_outcomes() -> usize {
    5
}

// ==================== Retry policy ====================

pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_retry_base_delay_ms() -> u64 {
    100
}

pub fn default_retry_max_delay_ms() -> u64 {
    30000
}

pub fn default_jitter_factor() -> f64 {
    0.1
}

pub fn default_error_window_secs() -> u64 {
    300
}

pub fn default_rate_limit_backoff_threshold() -> usize {
    3
}

pub fn default_resource_exhausted_redirect_threshold() -> usize {
    2
}

pub fn default_retryable_categories() -> HashSet<ErrorCategory> {
    HashSet::from([
        ErrorCategory::Timeout,
        ErrorCategory::RateLimit,
        ErrorCategory::ResourceExhausted,
        ErrorCategory::NetworkError,
    ])
}

pub fn default_method_limits() -> HashMap<String, u32> {
    [("GET", 5), ("POST", 2), ("PUT", 2), ("DELETE", 1)]
        .into_iter()
        .map(|(method, limit)| (method.to_string(), limit))
        .collect()
}

pub fn default_priority_limits() -> HashMap<Priority, u32> {
    HashMap::from([(Priority::High, 5), (Priority::Medium, 3), (Priority::Low, 1)])
}

// ==================== Logging ====================

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> LogFormat {
    LogFormat::Text
}
