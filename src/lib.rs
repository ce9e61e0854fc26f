//! # mesh-resilience
//!
//! Resilience core for service-mesh traffic: decides whether and when a failed call is
//! retried, computes adaptive retry delays, and tracks how health failures propagate
//! through a graph of service dependencies.
//!
//! ## Features
//!
//! - **Context-aware retries**: error classification plus method/priority retry budgets
//!   and rolling error-window escalation to BACKOFF or REDIRECT
//! - **Adaptive backoff**: six delay strategies, chosen per key from resource pressure,
//!   outcome patterns and learned effectiveness scores
//! - **Dependency health graph**: typed dependency edges, delayed failure cascades,
//!   gated recovery and per-service recovery loops
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mesh_resilience::{DependencyHealthGraph, DependencyType, GraphConfig, HealthStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let graph = DependencyHealthGraph::new(GraphConfig::default());
//!     graph.add_dependency("checkout", "inventory", DependencyType::Critical, 1.0)?;
//!
//!     graph.update_health("inventory", HealthStatus::Unhealthy, None).await;
//!     graph.wait_for_cascades().await;
//!
//!     assert_eq!(graph.get_health("checkout"), HealthStatus::Unhealthy);
//!     graph.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Retry decisions
//!
//! ```rust
//! use mesh_resilience::{ContextAwareRetry, RetryContext, RetryPolicy};
//!
//! let retry = ContextAwareRetry::new(RetryPolicy::default());
//! let context = RetryContext::new("TimedOut", "request timed out")
//!     .with_method("DELETE")
//!     .with_attempt(1);
//!
//! let (should_retry, _delay) = retry.should_retry(&context);
//! assert!(should_retry);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use config::ResilienceConfig;
pub use utils::error::{MeshError, Result};

pub use core::backoff::{AdaptiveBackoff, BackoffConfig, BackoffStrategy, StrategyScores};
pub use core::health::{
    DependencyHealthGraph, DependencyInfo, DependencyType, GraphConfig, GraphMetrics,
    HealthEvent, HealthStatus,
};
pub use core::retry::{
    ContextAwareRetry, ErrorCategory, ErrorClassifier, Priority, RetryContext, RetryDecision,
    RetryOutcome, RetryPolicy,
};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
