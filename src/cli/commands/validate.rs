//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after parsing, so a successful load means
        // the file is usable as-is.
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Source Kind: {}", config.source.kind);
        println!("  Snapshot Path: {}", config.source.snapshot_path);
        println!("  Report Timezone: {}", config.report.timezone);
        println!("  Output Directory: {}", config.output.directory);
        println!("  Overwrite: {}", config.output.overwrite);
        println!("  Log Level: {}", config.logging.level);
        println!("  Log Format: {}", config.logging.format);
        if config.logging.file_enabled {
            println!("  Log File Path: {}", config.logging.file_path);
        }
        println!();
        Ok(0)
    }
}
