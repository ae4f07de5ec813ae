//! Verify command implementation
//!
//! This module implements the `verify` command: parse a bundle archive,
//! recompute the artifact hashes, and compare them against the shipped
//! verification manifest.

use std::path::PathBuf;

use clap::Args;

use crate::core::archive::{entry_data, unpack_archive};
use crate::core::bundle::{parse_manifest, JSON_ENTRY, MANIFEST_ENTRY, PDF_ENTRY};
use crate::core::verification::sha256_hex;
use crate::domain::report::AerReport;
use crate::domain::{AerError, Result};

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the bundle ZIP to verify
    #[arg(short, long)]
    pub bundle: PathBuf,
}

/// What a successful verification established
#[derive(Debug)]
pub struct VerifyOutcome {
    pub report_id: String,
    pub json_hash: String,
    pub pdf_hash: String,
}

impl VerifyArgs {
    /// Execute the verify command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(bundle = %self.bundle.display(), "Starting verify command");

        let bytes = match std::fs::read(&self.bundle) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("FAIL: Cannot read bundle {}: {e}", self.bundle.display());
                println!("FAIL");
                return Ok(5);
            }
        };

        match verify_bundle(&bytes) {
            Ok(outcome) => {
                println!("REPORT_ID={}", outcome.report_id);
                println!("JSON_SHA256={}", outcome.json_hash);
                println!("PDF_SHA256={}", outcome.pdf_hash);
                println!("PASS");
                Ok(0)
            }
            Err(e) => {
                eprintln!("FAIL: {e}");
                println!("FAIL");
                Ok(4)
            }
        }
    }
}

/// Verify a bundle's integrity end to end
///
/// Parses the archive, recomputes both SHA-256 hashes, compares them to the
/// manifest, parses `AER.json` back into the report type (structural
/// validation), and checks the manifest `REPORT_ID` against the report's
/// own `audit_integrity.report_id`.
///
/// # Errors
///
/// Returns `AerError::Archive` for malformed containers and
/// `AerError::Verification` naming expected vs computed values for every
/// integrity mismatch.
pub fn verify_bundle(bytes: &[u8]) -> Result<VerifyOutcome> {
    let files = unpack_archive(bytes)?;

    let json = entry_data(&files, JSON_ENTRY)?;
    let pdf = entry_data(&files, PDF_ENTRY)?;
    let manifest_bytes = entry_data(&files, MANIFEST_ENTRY)?;

    let manifest_text = std::str::from_utf8(manifest_bytes).map_err(|_| {
        AerError::Verification(format!("{MANIFEST_ENTRY} is not valid UTF-8"))
    })?;
    let manifest = parse_manifest(manifest_text);

    let json_hash = sha256_hex(json);
    let pdf_hash = sha256_hex(pdf);

    let expected_json = manifest
        .get("JSON_SHA256")
        .ok_or_else(|| AerError::Verification("Manifest is missing JSON_SHA256".to_string()))?;
    if expected_json != &json_hash {
        return Err(AerError::Verification(format!(
            "JSON hash mismatch: manifest {expected_json}, computed {json_hash}"
        )));
    }

    let expected_pdf = manifest
        .get("PDF_SHA256")
        .ok_or_else(|| AerError::Verification("Manifest is missing PDF_SHA256".to_string()))?;
    if expected_pdf != &pdf_hash {
        return Err(AerError::Verification(format!(
            "PDF hash mismatch: manifest {expected_pdf}, computed {pdf_hash}"
        )));
    }

    // Structural validation: the JSON must deserialize into the report type.
    let report: AerReport = serde_json::from_slice(json).map_err(|e| {
        AerError::Verification(format!("{JSON_ENTRY} does not match the report shape: {e}"))
    })?;

    let expected_id = manifest
        .get("REPORT_ID")
        .ok_or_else(|| AerError::Verification("Manifest is missing REPORT_ID".to_string()))?;
    if expected_id != &report.audit_integrity.report_id {
        return Err(AerError::Verification(format!(
            "Report id mismatch: manifest {expected_id}, report {}",
            report.audit_integrity.report_id
        )));
    }

    Ok(VerifyOutcome {
        report_id: report.audit_integrity.report_id,
        json_hash,
        pdf_hash,
    })
}
