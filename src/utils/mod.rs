//! Utility modules
//!
//! ## Module Organization
//!
//! - **error**: Error types of the crate
//! - **logging**: Subscriber setup and logging configuration

pub mod error;
pub mod logging;

pub use error::{MeshError, Result};
pub use logging::{LogFormat, LoggingConfig, init_logging};
