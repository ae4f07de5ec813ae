//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AerConfig;
use crate::domain::errors::AerError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AerConfig
/// 4. Applies environment variable overrides (AER_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use aer::config::loader::load_config;
///
/// let config = load_config("aer.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AerConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AerError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: AerConfig = toml::from_str(&contents)
        .map_err(|e| AerError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| AerError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All missing variables are reported
/// together.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex");
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines - don't process env vars in comments
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(AerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the AER_* prefix
///
/// Environment variables follow the pattern: AER_<SECTION>_<KEY>,
/// for example AER_SOURCE_SNAPSHOT_PATH or AER_LOGGING_LEVEL.
fn apply_env_overrides(config: &mut AerConfig) {
    // Source overrides
    if let Ok(val) = std::env::var("AER_SOURCE_KIND") {
        config.source.kind = val;
    }
    if let Ok(val) = std::env::var("AER_SOURCE_SNAPSHOT_PATH") {
        config.source.snapshot_path = val;
    }

    // Report overrides
    if let Ok(val) = std::env::var("AER_REPORT_TIMEZONE") {
        config.report.timezone = val;
    }

    // Output overrides
    if let Ok(val) = std::env::var("AER_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }
    if let Ok(val) = std::env::var("AER_OUTPUT_OVERWRITE") {
        config.output.overwrite = val.parse().unwrap_or(false);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("AER_LOGGING_LEVEL") {
        config.logging.level = val;
    }
    if let Ok(val) = std::env::var("AER_LOGGING_FORMAT") {
        config.logging.format = val;
    }
    if let Ok(val) = std::env::var("AER_LOGGING_FILE_ENABLED") {
        config.logging.file_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("AER_LOGGING_FILE_PATH") {
        config.logging.file_path = val;
    }
}
