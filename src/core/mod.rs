//! Core resilience components
//!
//! This module contains retry classification, adaptive backoff and the dependency
//! health graph. The three are independent of each other.

pub mod backoff; // Adaptive retry delays
pub mod health; // Dependency graph and cascades
pub mod retry; // Error classification and retry decisions
