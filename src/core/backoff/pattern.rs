//! Outcome pattern detection
//!
//! A pattern is a run of attempt outcomes that exactly repeats the run immediately before
//! it, e.g. `[.., T, F, T, F]`. The shortest repeating run is reported, so an alternating
//! sequence yields a length of 2 however long the history is.

use super::types::BackoffState;
use std::collections::VecDeque;
use std::time::Instant;

/// A detected outcome pattern
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternMatch {
    /// Length of the repeating run
    pub length: usize,
    /// Mean wall-clock interval between consecutive attempts (seconds), if measurable
    pub mean_interval: Option<f64>,
}

/// Length of the shortest run (at least 2) whose last occurrence repeats the one before it
pub fn detect_pattern_length(outcomes: &[bool]) -> Option<usize> {
    let n = outcomes.len();
    (2..=n / 2).find(|&length| outcomes[n - length..] == outcomes[n - 2 * length..n - length])
}

/// Detect a pattern in a key's outcome history
pub fn detect_pattern(state: &BackoffState) -> Option<PatternMatch> {
    let outcomes: Vec<bool> = state.outcomes.iter().copied().collect();
    let length = detect_pattern_length(&outcomes)?;

    Some(PatternMatch {
        length,
        mean_interval: mean_interval(&state.attempt_times),
    })
}

/// Mean interval between consecutive instants (seconds)
pub fn mean_interval(times: &VecDeque<Instant>) -> Option<f64> {
    if times.len() < 2 {
        return None;
    }

    let total: f64 = times
        .iter()
        .zip(times.iter().skip(1))
        .map(|(earlier, later)| later.saturating_duration_since(*earlier).as_secs_f64())
        .sum();

    Some(total / (times.len() - 1) as f64)
}
