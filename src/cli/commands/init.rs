//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "aer.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing AER configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Point source.snapshot_path at a system-of-record export");
                println!("  3. Validate configuration: aer validate-config");
                println!(
                    "  4. Generate a bundle: aer generate --clinic-id <id> --client-id <id> \
                     --start YYYY-MM-DD --end YYYY-MM-DD"
                );
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Sample configuration content
    fn sample_config() -> &'static str {
        r#"# AER Configuration File
# Adherence Evidence Report compiler

[source]
# Event source; only "snapshot" is supported in v1
kind = "snapshot"
# JSON snapshot export of the system of record
snapshot_path = "snapshot.json"

[report]
# Recorded in provenance; report instants are computed in UTC
timezone = "UTC"

[output]
# Bundles and reports are written here
directory = "./out"
# Refuse to replace existing artifacts unless true
overwrite = false

[logging]
level = "info"
# "text" or "json"
format = "text"
file_enabled = false
file_path = "./logs"
"#
    }
}
