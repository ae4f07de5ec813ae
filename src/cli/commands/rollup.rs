//! Rollup command implementation
//!
//! This module implements the `rollup` command: build the clinic-level
//! adherence rollup for a period and write it as JSON.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use clap::Args;

use crate::adapters::source::create_event_source;
use crate::config::load_config;
use crate::core::rollup::{RollupBuilder, RollupRequest, DEFAULT_CLIENT_LIMIT, MAX_CLIENT_LIMIT};
use crate::domain::ids::ClinicId;
use crate::domain::period::ReportPeriod;
use crate::domain::AerError;

/// Arguments for the rollup command
#[derive(Args, Debug)]
pub struct RollupArgs {
    /// Clinic the rollup covers
    #[arg(long)]
    pub clinic_id: String,

    /// Period start date (YYYY-MM-DD); defaults to 30 days before end
    #[arg(long)]
    pub start: Option<String>,

    /// Period end date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub end: Option<String>,

    /// Optional program filter
    #[arg(long)]
    pub program: Option<String>,

    /// Maximum number of client rows (1-500)
    #[arg(long, default_value_t = DEFAULT_CLIENT_LIMIT)]
    pub limit: usize,

    /// Output path (defaults to the rollup filename in the configured
    /// output directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RollupArgs {
    /// Execute the rollup command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(clinic_id = %self.clinic_id, "Starting rollup command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let request = match self.build_request() {
            Ok(r) => r,
            Err(e) => {
                eprintln!("❌ Invalid request: {e}");
                return Ok(super::exit_code_for(&e));
            }
        };

        let source = match create_event_source(&config).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to open event source: {e}");
                return Ok(super::exit_code_for(&e));
            }
        };

        let builder = RollupBuilder::new(source);
        let rollup = match builder.generate(&request).await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("❌ Rollup generation failed: {e}");
                return Ok(super::exit_code_for(&e));
            }
        };
        let json = rollup.to_json_bytes().map_err(AerError::from)?;

        println!("Clinic:           {}", rollup.meta.clinic_id);
        println!("Period:           {} to {}", rollup.meta.period.start, rollup.meta.period.end);
        println!("Clients in scope: {}", rollup.summary.clients_in_scope);
        println!("Completion rate:  {:.4}", rollup.summary.completion_rate);

        let path = match &self.output {
            Some(path) => path.clone(),
            None => Path::new(&config.output.directory).join(rollup_filename(&request)),
        };

        if path.exists() && !config.output.overwrite {
            eprintln!(
                "❌ Output file already exists: {} (set output.overwrite = true to replace)",
                path.display()
            );
            return Ok(2);
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&path, &json)?;

        tracing::info!(path = %path.display(), bytes = json.len(), "Rollup written");
        println!();
        println!("✅ Written: {}", path.display());
        Ok(0)
    }

    fn build_request(&self) -> crate::domain::Result<RollupRequest> {
        let clinic_id = ClinicId::new(self.clinic_id.as_str()).map_err(AerError::Other)?;

        if self.limit == 0 || self.limit > MAX_CLIENT_LIMIT {
            return Err(AerError::InvalidRange(format!(
                "limit must be between 1 and {MAX_CLIENT_LIMIT}"
            )));
        }

        let end_label = match &self.end {
            Some(label) => label.clone(),
            None => Utc::now().format("%Y-%m-%d").to_string(),
        };
        let start_label = match &self.start {
            Some(label) => label.clone(),
            None => {
                let end_date =
                    crate::domain::period::parse_date_label(&end_label).ok_or_else(|| {
                        AerError::InvalidRange(
                            "Invalid date format (expected YYYY-MM-DD)".to_string(),
                        )
                    })?;
                (end_date - Duration::days(30)).format("%Y-%m-%d").to_string()
            }
        };
        let period = ReportPeriod::from_labels(&start_label, &end_label)?;

        Ok(RollupRequest {
            clinic_id,
            period,
            program: self.program.clone(),
            limit: self.limit,
            cursor: None,
            generated_at_override: None,
        })
    }
}

/// Download-style file name for a rollup report
fn rollup_filename(request: &RollupRequest) -> String {
    format!(
        "AER_ROLLUP_{}_{}_{}.json",
        request.clinic_id,
        request.period.start_label(),
        request.period.end_label()
    )
}
