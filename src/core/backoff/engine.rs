//! Adaptive backoff engine
//!
//! Hands out per-key retry delays, choosing a strategy for each call and learning which
//! strategies work from the outcomes the transport reports back.

use super::pattern::detect_pattern;
use super::strategy::compute_delay;
use super::types::{BackoffConfig, BackoffState, BackoffStateSnapshot, BackoffStrategy};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Shared strategy effectiveness table.
///
/// Cloning yields another handle to the same table, so several engines can learn
/// together when constructed with [`AdaptiveBackoff::with_scores`].
#[derive(Debug, Clone)]
pub struct StrategyScores {
    inner: Arc<RwLock<HashMap<BackoffStrategy, f64>>>,
}

impl Default for StrategyScores {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyScores {
    /// Every strategy starts with a score of 1.0
    pub fn new() -> Self {
        let scores = BackoffStrategy::ALL.iter().map(|s| (*s, 1.0)).collect();
        Self {
            inner: Arc::new(RwLock::new(scores)),
        }
    }

    pub fn get(&self, strategy: BackoffStrategy) -> f64 {
        self.inner.read().get(&strategy).copied().unwrap_or(1.0)
    }

    pub fn set(&self, strategy: BackoffStrategy, score: f64) {
        self.inner.write().insert(strategy, score);
    }

    pub fn snapshot(&self) -> HashMap<BackoffStrategy, f64> {
        self.inner.read().clone()
    }

    /// Highest scoring strategy; ties go to the earliest in [`BackoffStrategy::ALL`]
    pub fn best(&self) -> BackoffStrategy {
        let scores = self.inner.read();
        let mut best = BackoffStrategy::Exponential;
        let mut best_score = f64::NEG_INFINITY;
        for strategy in BackoffStrategy::ALL {
            let score = scores.get(&strategy).copied().unwrap_or(1.0);
            if score > best_score {
                best = strategy;
                best_score = score;
            }
        }
        best
    }
}

/// Adaptive backoff engine
#[derive(Debug)]
pub struct AdaptiveBackoff {
    config: BackoffConfig,
    states: DashMap<String, Arc<Mutex<BackoffState>>>,
    scores: StrategyScores,
}

impl Default for AdaptiveBackoff {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}

impl AdaptiveBackoff {
    /// Create an engine with its own effectiveness table
    pub fn new(config: BackoffConfig) -> Self {
        Self::with_scores(config, StrategyScores::new())
    }

    /// Create an engine that learns into an existing effectiveness table
    pub fn with_scores(config: BackoffConfig, scores: StrategyScores) -> Self {
        Self {
            config,
            states: DashMap::new(),
            scores,
        }
    }

    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// Handle to the effectiveness table
    pub fn scores(&self) -> StrategyScores {
        self.scores.clone()
    }

    /// Next delay for `key`, optionally informed by a resource pressure sample in `0..=1`.
    ///
    /// Always returns a value within `[0, max_delay]`.
    pub fn get_delay(&self, key: &str, resource_usage: Option<f64>) -> Duration {
        let state = self.state_for(key);
        let mut state = state.lock();

        if let Some(usage) = resource_usage {
            state.record_resource(usage, self.config.history_size);
        }

        let strategy = self.select_strategy(&state, resource_usage);
        state.attempt = state.attempt.saturating_add(1);

        let scores = self.scores.snapshot();
        let raw = compute_delay(strategy, &self.config, &state, &scores);
        let delay = self.finalize(raw);

        state.record_delay(delay, strategy, Instant::now(), self.config.history_size);

        debug!(
            key = %key,
            strategy = ?strategy,
            attempt = state.attempt,
            delay_secs = delay,
            "Computed backoff delay"
        );

        Duration::from_secs_f64(delay)
    }

    /// Feed the outcome of an attempt back into the engine
    pub fn record_attempt(&self, key: &str, success: bool) {
        let state = self.state_for(key);
        let (strategy, score) = {
            let mut state = state.lock();
            state.record_outcome(success, self.config.history_size);
            (state.last_strategy, effectiveness(&state, success))
        };

        if let Some(strategy) = strategy {
            self.scores.set(strategy, score);
            debug!(
                key = %key,
                strategy = ?strategy,
                success,
                score,
                "Updated strategy effectiveness"
            );
        }
    }

    /// Strategy the next `get_delay` call for `key` would use
    pub fn select_strategy_for(&self, key: &str, resource_usage: Option<f64>) -> BackoffStrategy {
        match self.states.get(key) {
            Some(state) => self.select_strategy(&state.lock(), resource_usage),
            None => BackoffStrategy::Exponential,
        }
    }

    /// Current effectiveness of every strategy
    pub fn effectiveness_scores(&self) -> HashMap<BackoffStrategy, f64> {
        self.scores.snapshot()
    }

    pub fn state_snapshot(&self, key: &str) -> Option<BackoffStateSnapshot> {
        self.states.get(key).map(|state| state.lock().snapshot())
    }

    /// Forget everything learned for `key` while keeping it tracked
    pub fn reset(&self, key: &str) {
        if let Some(state) = self.states.get(key) {
            *state.lock() = BackoffState::new();
        }
    }

    /// Stop tracking `key`
    pub fn remove(&self, key: &str) -> bool {
        self.states.remove(key).is_some()
    }

    pub fn tracked_keys(&self) -> Vec<String> {
        self.states.iter().map(|entry| entry.key().clone()).collect()
    }

    fn state_for(&self, key: &str) -> Arc<Mutex<BackoffState>> {
        if let Some(state) = self.states.get(key) {
            return state.clone();
        }
        self.states
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(BackoffState::new())))
            .clone()
    }

    fn select_strategy(&self, state: &BackoffState, resource_usage: Option<f64>) -> BackoffStrategy {
        if state.last_delay.is_none() {
            return BackoffStrategy::Exponential;
        }

        if resource_usage.is_some_and(|usage| usage > self.config.resource_threshold) {
            return BackoffStrategy::ResourceSensitive;
        }

        if state.outcomes.len() >= self.config.min_pattern_outcomes
            && detect_pattern(state).is_some()
        {
            return BackoffStrategy::PatternBased;
        }

        self.scores.best()
    }

    /// Apply jitter and clamp to `[0, max_delay]`
    fn finalize(&self, raw: f64) -> f64 {
        let max_delay = self.config.max_delay_secs.max(0.0);
        if raw.is_nan() {
            return 0.0;
        }

        let jitter = self.config.jitter.abs();
        let jittered = if jitter > 0.0 && raw.is_finite() {
            raw * (1.0 + rand::thread_rng().gen_range(-jitter..=jitter))
        } else {
            raw
        };

        jittered.clamp(0.0, max_delay)
    }
}

/// Effectiveness of the strategy that produced the latest delay
fn effectiveness(state: &BackoffState, success: bool) -> f64 {
    let success_rate = state.success_rate();

    let n = state.delays.len();
    let delay_efficiency = if n >= 2 && state.delays[n - 1] > state.delays[n - 2] && success {
        0.8
    } else {
        1.0
    };

    let resource_efficiency = if state.resource_states.is_empty() {
        1.0
    } else {
        let mean =
            state.resource_states.iter().sum::<f64>() / state.resource_states.len() as f64;
        1.0 - mean
    };

    0.5 * success_rate + 0.3 * delay_efficiency + 0.2 * resource_efficiency
}
