//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the AER compiler
//! using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// AER - Adherence Evidence Report compiler
#[derive(Parser, Debug)]
#[command(name = "aer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "aer.toml", env = "AER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "AER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an evidence bundle for one client and period
    Generate(commands::generate::GenerateArgs),

    /// Generate a clinic-level adherence rollup
    Rollup(commands::rollup::RollupArgs),

    /// Verify the integrity of a previously generated bundle
    Verify(commands::verify::VerifyArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
