//! Adaptive backoff types
//!
//! Strategy identifiers, engine configuration and the per-key state the engine learns from.

use crate::config::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Backoff strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    Exponential,
    Fibonacci,
    DecorrelatedJitter,
    ResourceSensitive,
    PatternBased,
    Adaptive,
}

impl BackoffStrategy {
    /// All strategies, in tie-break order for score-based selection
    pub const ALL: [BackoffStrategy; 6] = [
        BackoffStrategy::Exponential,
        BackoffStrategy::Fibonacci,
        BackoffStrategy::DecorrelatedJitter,
        BackoffStrategy::ResourceSensitive,
        BackoffStrategy::PatternBased,
        BackoffStrategy::Adaptive,
    ];
}

/// Adaptive backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Delay of the first attempt (seconds)
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: f64,
    /// Upper bound for every delay (seconds)
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: f64,
    /// Exponential growth factor
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Relative jitter applied to every delay
    #[serde(default = "default_jitter")]
    pub jitter: f64,
    /// Resource usage above which the resource-sensitive strategy is forced
    #[serde(default = "default_resource_threshold")]
    pub resource_threshold: f64,
    /// Maximum entries kept in each per-key history list
    #[serde(default = "default_backoff_history_size")]
    pub history_size: usize,
    /// Outcomes required before pattern detection is attempted
    #[serde(default = "default_min_pattern_outcomes")]
    pub min_pattern_outcomes: usize,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: default_initial_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
            resource_threshold: default_resource_threshold(),
            history_size: default_backoff_history_size(),
            min_pattern_outcomes: default_min_pattern_outcomes(),
        }
    }
}

impl BackoffConfig {
    pub fn max_delay(&self) -> Duration {
        Duration::from_secs_f64(self.max_delay_secs.max(0.0))
    }
}

/// Per-key backoff state
///
/// `delays`/`attempt_times` grow on every `get_delay`, `outcomes` on every
/// `record_attempt`. All lists are ordered oldest to newest and bounded by the
/// configured history size.
#[derive(Debug, Clone, Default)]
pub struct BackoffState {
    /// Number of delays handed out for this key
    pub attempt: u32,
    /// Most recent delay (seconds)
    pub last_delay: Option<f64>,
    /// When the most recent delay was handed out
    pub last_attempt: Option<Instant>,
    pub success_count: u64,
    pub failure_count: u64,
    /// Past delays (seconds)
    pub delays: VecDeque<f64>,
    /// Wall-clock instant of each delay in `delays`
    pub attempt_times: VecDeque<Instant>,
    /// Past attempt outcomes
    pub outcomes: VecDeque<bool>,
    /// Resource usage samples in `0..=1`
    pub resource_states: VecDeque<f64>,
    /// Strategy that produced `last_delay`
    pub last_strategy: Option<BackoffStrategy>,
}

impl BackoffState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a handed-out delay
    pub fn record_delay(
        &mut self,
        delay: f64,
        strategy: BackoffStrategy,
        now: Instant,
        history_size: usize,
    ) {
        self.last_delay = Some(delay);
        self.last_attempt = Some(now);
        self.last_strategy = Some(strategy);
        push_bounded(&mut self.delays, delay, history_size);
        push_bounded(&mut self.attempt_times, now, history_size);
    }

    /// Record an attempt outcome
    pub fn record_outcome(&mut self, success: bool, history_size: usize) {
        if success {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
        push_bounded(&mut self.outcomes, success, history_size);
    }

    /// Record a resource usage sample, clamped to `0..=1`
    pub fn record_resource(&mut self, usage: f64, history_size: usize) {
        let usage = if usage.is_finite() {
            usage.clamp(0.0, 1.0)
        } else {
            1.0
        };
        push_bounded(&mut self.resource_states, usage, history_size);
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.success_count + self.failure_count;
        if total == 0 {
            1.0
        } else {
            self.success_count as f64 / total as f64
        }
    }

    pub fn snapshot(&self) -> BackoffStateSnapshot {
        BackoffStateSnapshot {
            attempt: self.attempt,
            last_delay_secs: self.last_delay,
            success_count: self.success_count,
            failure_count: self.failure_count,
            delays: self.delays.iter().copied().collect(),
            outcomes: self.outcomes.iter().copied().collect(),
            resource_states: self.resource_states.iter().copied().collect(),
            last_strategy: self.last_strategy,
        }
    }
}

fn push_bounded<T>(list: &mut VecDeque<T>, value: T, capacity: usize) {
    list.push_back(value);
    while list.len() > capacity.max(1) {
        list.pop_front();
    }
}

/// Serializable view of a key's backoff state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffStateSnapshot {
    pub attempt: u32,
    pub last_delay_secs: Option<f64>,
    pub success_count: u64,
    pub failure_count: u64,
    pub delays: Vec<f64>,
    pub outcomes: Vec<bool>,
    pub resource_states: Vec<f64>,
    pub last_strategy: Option<BackoffStrategy>,
}
