//! Common test utilities for mesh-resilience
//!
//! - Fast configurations and graph topologies
//! - Custom assertions and helpers

pub mod assertions;
pub mod fixtures;

// Re-export commonly used items
pub use fixtures::{GraphFixture, fast_graph_config, fixed_backoff_config, fixed_retry_policy};
