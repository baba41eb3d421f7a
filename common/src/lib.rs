//! Shared utilities for mongo-init components
//!
//! This crate provides common functionality used by the initialization binaries:
//! - Structured logging initialization
//! - Environment variable parsing helpers
//! - Command execution utilities

pub mod command;
pub mod config;
pub mod logging;

pub use command::{run_with_input, CommandOutput};
pub use config::ConfigExt;
pub use logging::init_logging;
