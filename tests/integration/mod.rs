//! Integration tests for mesh-resilience
//!
//! These tests verify behavior through the public API only.

pub mod backoff_tests;
pub mod config_tests;
pub mod graph_tests;
pub mod retry_tests;
