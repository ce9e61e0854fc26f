//! Context-aware retry classification
//!
//! This module decides what a transport should do after a failed call.
//!
//! # Module Structure
//!
//! - `types` - Error categories, retry context, decisions and policy
//! - `classifier` - Error type/message to category mapping
//! - `strategy` - Retry decisions over a rolling error history
//! - `tests` - Test suite for retry classification

pub mod classifier;
pub mod strategy;
pub mod types;

pub use classifier::ErrorClassifier;
pub use strategy::{ContextAwareRetry, RetryClassifierStats};
pub use types::{ErrorCategory, Priority, RetryContext, RetryDecision, RetryOutcome, RetryPolicy};
