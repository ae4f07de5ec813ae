//! Logging and observability
//!
//! This module provides structured logging for the AER compiler:
//! - Console output in text or JSON format
//! - Configurable log levels
//! - Optional JSON file logging with daily rotation
//!
//! # Example
//!
//! ```no_run
//! use aer::logging::init_logging;
//! use aer::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Report generation started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};
