//! Generate command implementation
//!
//! This module implements the `generate` command: build the evidence bundle
//! (or just the JSON report) for one client and period and write it to the
//! output directory.

use std::path::{Path, PathBuf};

use clap::Args;
use tokio::sync::watch;

use crate::adapters::source::create_event_source;
use crate::config::load_config;
use crate::core::bundle::{bundle_filename, BundleBuilder};
use crate::core::report::{EvidenceAggregator, ReportRequest};
use crate::core::verification::sha256_hex;
use crate::domain::ids::{ClientId, ClinicId};
use crate::domain::period::ReportPeriod;
use crate::domain::AerError;

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Clinic the report is scoped to
    #[arg(long)]
    pub clinic_id: String,

    /// Client the report covers
    #[arg(long)]
    pub client_id: String,

    /// Period start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// Period end date (YYYY-MM-DD)
    #[arg(long)]
    pub end: String,

    /// Optional program filter
    #[arg(long)]
    pub program: Option<String>,

    /// Output path (defaults to the bundle filename in the configured
    /// output directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write only the JSON report, no PDF or archive
    #[arg(long)]
    pub json_only: bool,

    /// Run the full pipeline and report sizes/hashes without writing
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    /// Execute the generate command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(
            clinic_id = %self.clinic_id,
            client_id = %self.client_id,
            start = %self.start,
            end = %self.end,
            "Starting generate command"
        );

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        // Validate the request before any fetch happens.
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

        if self.json_only {
            // Same generated-at pinning as the bundle pipeline, so the JSON
            // bytes match what a full bundle for this period would carry.
            let mut request = request;
            request.generated_at_override =
                Some(request.generated_at_override.unwrap_or_else(|| request.period.end()));

            let aggregator = EvidenceAggregator::new(source);
            let report = match aggregator.generate(&request).await {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("❌ Report generation failed: {e}");
                    return Ok(super::exit_code_for(&e));
                }
            };
            let json = report.to_json_bytes().map_err(AerError::from)?;

            println!("Report ID:   {}", report.audit_integrity.report_id);
            println!("JSON_SHA256: {}", sha256_hex(&json));
            println!("Size:        {} bytes", json.len());

            if self.dry_run {
                println!();
                println!("✅ Dry run complete, nothing written");
                return Ok(0);
            }

            let path = self.resolve_output(&config.output.directory, &json_filename(&request));
            return self.write_artifact(&path, &json, &config, &shutdown_signal);
        }

        let builder = BundleBuilder::new(source);
        let outcome = match builder.generate(&request).await {
            Ok(o) => o,
            Err(e) => {
                eprintln!("❌ Report generation failed: {e}");
                return Ok(super::exit_code_for(&e));
            }
        };

        println!("Report ID:   {}", outcome.report_id);
        println!("JSON_SHA256: {}", outcome.json_hash);
        println!("PDF_SHA256:  {}", outcome.pdf_hash);
        println!("Size:        {} bytes", outcome.buffer.len());

        if self.dry_run {
            println!();
            println!("✅ Dry run complete, nothing written");
            return Ok(0);
        }

        let path = self.resolve_output(&config.output.directory, &bundle_filename(&request));
        self.write_artifact(&path, &outcome.buffer, &config, &shutdown_signal)
    }

    fn build_request(&self) -> crate::domain::Result<ReportRequest> {
        let clinic_id = ClinicId::new(self.clinic_id.as_str()).map_err(AerError::Other)?;
        let client_id = ClientId::new(self.client_id.as_str()).map_err(AerError::Other)?;
        let period = ReportPeriod::from_labels(&self.start, &self.end)?;
        Ok(ReportRequest {
            clinic_id,
            client_id,
            period,
            program: self.program.clone(),
            generated_at_override: None,
        })
    }

    fn resolve_output(&self, directory: &str, filename: &str) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => Path::new(directory).join(filename),
        }
    }

    fn write_artifact(
        &self,
        path: &Path,
        bytes: &[u8],
        config: &crate::config::AerConfig,
        shutdown_signal: &watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        if *shutdown_signal.borrow() {
            eprintln!("⚠️  Shutdown requested, nothing written");
            return Ok(5);
        }

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
        std::fs::write(path, bytes)?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Artifact written");
        println!();
        println!("✅ Written: {}", path.display());
        Ok(0)
    }
}

/// Download-style file name for a JSON-only report
fn json_filename(request: &ReportRequest) -> String {
    format!(
        "AER_{}_{}_{}_{}.json",
        request.clinic_id,
        request.client_id,
        request.period.start_label(),
        request.period.end_label()
    )
}
