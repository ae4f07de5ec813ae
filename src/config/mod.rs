//! Configuration management for the AER compiler.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! The tool uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Environment variable overrides (`AER_*` prefix)
//! - Default values for optional settings
//! - Validation that reports every problem at once
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use aer::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("aer.toml")?;
//!
//! println!("Source: {}", config.source.snapshot_path);
//! println!("Output: {}", config.output.directory);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! kind = "snapshot"
//! snapshot_path = "snapshot.json"
//!
//! [output]
//! directory = "./out"
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used items
pub use loader::load_config;
pub use schema::{AerConfig, LoggingConfig, OutputConfig, ReportConfig, SourceConfig};
