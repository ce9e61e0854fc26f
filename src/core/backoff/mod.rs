//! Adaptive backoff
//!
//! Multi-strategy retry delay computation with online strategy selection.
//!
//! # Module Structure
//!
//! - `types` - Strategies, configuration and per-key state
//! - `strategy` - Delay formulas
//! - `pattern` - Repeating outcome detection
//! - `engine` - The adaptive engine and its shared effectiveness table
//! - `tests` - Test suite for adaptive backoff

pub mod engine;
pub mod pattern;
pub mod strategy;
pub mod types;

pub use engine::{AdaptiveBackoff, StrategyScores};
pub use pattern::{PatternMatch, detect_pattern, detect_pattern_length};
pub use types::{BackoffConfig, BackoffState, BackoffStateSnapshot, BackoffStrategy};
