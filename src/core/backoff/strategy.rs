//! Delay formulas for each backoff strategy
//!
//! All functions return raw delays in seconds; jitter and clamping are applied by the
//! engine afterwards. `state.attempt` is the 1-based counter for the delay being computed.

use super::pattern::detect_pattern;
use super::types::{BackoffConfig, BackoffState, BackoffStrategy};
use rand::Rng;
use std::collections::HashMap;

/// Compute the raw delay for a strategy
pub fn compute_delay(
    strategy: BackoffStrategy,
    config: &BackoffConfig,
    state: &BackoffState,
    scores: &HashMap<BackoffStrategy, f64>,
) -> f64 {
    match strategy {
        BackoffStrategy::Exponential => exponential(config, state),
        BackoffStrategy::Fibonacci => fibonacci(config, state),
        BackoffStrategy::DecorrelatedJitter => decorrelated_jitter(config, state),
        BackoffStrategy::ResourceSensitive => resource_sensitive(config, state),
        BackoffStrategy::PatternBased => pattern_based(config, state),
        BackoffStrategy::Adaptive => adaptive(config, state, scores),
    }
}

fn exponential(config: &BackoffConfig, state: &BackoffState) -> f64 {
    let exponent = state.attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
    config.initial_delay_secs * config.multiplier.powi(exponent)
}

fn fibonacci(config: &BackoffConfig, state: &BackoffState) -> f64 {
    let n = state.delays.len();
    if state.attempt <= 2 || n < 2 {
        return config.initial_delay_secs;
    }
    state.delays[n - 1] + state.delays[n - 2]
}

fn decorrelated_jitter(config: &BackoffConfig, state: &BackoffState) -> f64 {
    let Some(last) = state.last_delay else {
        return config.initial_delay_secs;
    };

    let low = config.initial_delay_secs;
    let high = (last * 3.0).max(low);
    if high > low && high.is_finite() {
        rand::thread_rng().gen_range(low..=high)
    } else {
        low
    }
}

fn resource_sensitive(config: &BackoffConfig, state: &BackoffState) -> f64 {
    let pressure = state.resource_states.back().copied().unwrap_or(0.0);
    exponential(config, state) * (1.0 + pressure)
}

fn pattern_based(config: &BackoffConfig, state: &BackoffState) -> f64 {
    match detect_pattern(state).and_then(|p| p.mean_interval) {
        Some(interval) => {
            let step = state.attempt.saturating_sub(1) as f64;
            interval * (1.0 + step * 0.1)
        }
        None => config.initial_delay_secs,
    }
}

fn adaptive(
    config: &BackoffConfig,
    state: &BackoffState,
    scores: &HashMap<BackoffStrategy, f64>,
) -> f64 {
    let components = [
        (BackoffStrategy::Exponential, exponential(config, state)),
        (BackoffStrategy::Fibonacci, fibonacci(config, state)),
        (
            BackoffStrategy::DecorrelatedJitter,
            decorrelated_jitter(config, state),
        ),
    ];

    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (strategy, delay) in components {
        let weight = scores.get(&strategy).copied().unwrap_or(1.0).max(0.0);
        weighted += weight * delay;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        weighted / total_weight
    } else {
        exponential(config, state)
    }
}
