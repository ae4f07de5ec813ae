//! Configuration schema types
//!
//! This module defines the configuration structure for the AER compiler.
//! Every section has serde defaults so a minimal `aer.toml` only needs to
//! name the snapshot file.

use serde::{Deserialize, Serialize};

/// Main AER configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AerConfig {
    /// Event-source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Report generation settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AerConfig {
    /// Validates the configuration
    ///
    /// Collects every problem instead of stopping at the first one, so a
    /// misconfigured deployment surfaces all of its mistakes in one run.
    ///
    /// # Errors
    ///
    /// Returns an error listing all invalid configuration values.
    pub fn validate(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        self.source.validate(&mut problems);
        self.report.validate(&mut problems);
        self.output.validate(&mut problems);
        self.logging.validate(&mut problems);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}

/// Event-source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Adapter kind; only "snapshot" ships in v1
    #[serde(default = "default_source_kind")]
    pub kind: String,

    /// Path to the JSON snapshot export of the system of record
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl SourceConfig {
    fn validate(&self, problems: &mut Vec<String>) {
        if self.kind != "snapshot" {
            problems.push(format!(
                "Invalid source.kind '{}'. Must be: snapshot",
                self.kind
            ));
        }
        if self.snapshot_path.trim().is_empty() {
            problems.push("source.snapshot_path must not be empty".to_string());
        }
    }
}

/// Report generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// IANA timezone name recorded in provenance; v1 computes in UTC
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Reserved generator label
    #[serde(default)]
    pub generator: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            generator: String::new(),
        }
    }
}

impl ReportConfig {
    fn validate(&self, problems: &mut Vec<String>) {
        if self.timezone.trim().is_empty() {
            problems.push("report.timezone must not be empty".to_string());
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory bundles and reports are written to
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Whether existing output files may be overwritten
    #[serde(default)]
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            overwrite: false,
        }
    }
}

impl OutputConfig {
    fn validate(&self, problems: &mut Vec<String>) {
        if self.directory.trim().is_empty() {
            problems.push("output.directory must not be empty".to_string());
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output format ("text" or "json")
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Enable JSON file logging with daily rotation
    #[serde(default)]
    pub file_enabled: bool,

    /// Directory for rotated log files
    #[serde(default = "default_log_file_path")]
    pub file_path: String,

    /// Include timestamps in console output
    #[serde(default = "default_true")]
    pub include_timestamps: bool,

    /// Emit span close events
    #[serde(default)]
    pub include_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file_enabled: false,
            file_path: default_log_file_path(),
            include_timestamps: true,
            include_spans: false,
        }
    }
}

impl LoggingConfig {
    fn validate(&self, problems: &mut Vec<String>) {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            problems.push(format!(
                "Invalid logging.level '{}'. Must be one of: {}",
                self.level,
                valid_levels.join(", ")
            ));
        }
        if self.format != "text" && self.format != "json" {
            problems.push(format!(
                "Invalid logging.format '{}'. Must be: text, json",
                self.format
            ));
        }
        if self.file_enabled && self.file_path.trim().is_empty() {
            problems.push("logging.file_path must not be empty when file_enabled".to_string());
        }
    }
}

fn default_source_kind() -> String {
    "snapshot".to_string()
}

fn default_snapshot_path() -> String {
    "snapshot.json".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_output_directory() -> String {
    "./out".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file_path() -> String {
    "./logs".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.source.kind, "snapshot");
        assert_eq!(config.output.directory, "./out");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_minimal_toml_parses_with_defaults() {
        let config: AerConfig = toml::from_str(
            r#"
[source]
snapshot_path = "export.json"
"#,
        )
        .unwrap();
        assert_eq!(config.source.snapshot_path, "export.json");
        assert_eq!(config.report.timezone, "UTC");
        assert!(config.logging.include_timestamps);
        assert!(!config.output.overwrite);
    }

    #[test]
    fn test_empty_toml_parses() {
        let config: AerConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_source_kind_rejected() {
        let mut config = AerConfig::default();
        config.source.kind = "postgres".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("source.kind"));
    }

    #[test]
    fn test_validation_collects_all_problems() {
        let mut config = AerConfig::default();
        config.source.kind = "nope".to_string();
        config.logging.level = "loud".to_string();
        config.output.directory = " ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("source.kind"));
        assert!(err.contains("logging.level"));
        assert!(err.contains("output.directory"));
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        let mut config = AerConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().unwrap_err().contains("logging.format"));
    }

    #[test]
    fn test_file_logging_requires_path() {
        let mut config = AerConfig::default();
        config.logging.file_enabled = true;
        config.logging.file_path = String::new();
        assert!(config.validate().unwrap_err().contains("file_path"));
    }
}
