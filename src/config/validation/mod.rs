//! Configuration validation
//!
//! This module provides validation logic for all configuration structures.
//!
//! The validation is organized into several submodules:
//! - `trait_def`: Core Validate trait definition
//! - `graph_validators`: Dependency graph validators
//! - `retry_validators`: Retry policy and backoff validators
//! - `tests`: Test suite for all validators

mod graph_validators;
mod retry_validators;
mod trait_def;

pub use trait_def::Validate;
