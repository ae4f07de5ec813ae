//! Verification manifest
//!
//! The plaintext `verification.txt` shipped inside every bundle. Line
//! order is a compatibility surface: verifiers key off these exact names,
//! so changes must be additive (new trailing lines), never reordering.

use std::collections::HashMap;

use crate::domain::report::AerReport;
use crate::domain::Result;

/// Archive entry name of the JSON artifact
pub const JSON_ENTRY: &str = "AER.json";

/// Archive entry name of the PDF artifact
pub const PDF_ENTRY: &str = "AER.pdf";

/// Archive entry name of the manifest itself
pub const MANIFEST_ENTRY: &str = "verification.txt";

/// Render the manifest for a report and its artifact hashes
///
/// # Errors
///
/// Fails only if the verification metadata cannot be serialized, which a
/// well-formed report never triggers.
pub fn build_manifest(report: &AerReport, json_hash: &str, pdf_hash: &str) -> Result<String> {
    let verification = serde_json::to_string(&report.meta.verification)?;
    Ok([
        format!("REPORT_ID={}", report.audit_integrity.report_id),
        format!("GENERATED_AT={}", report.meta.generated_at),
        format!("META_VERIFICATION={verification}"),
        format!("JSON_SHA256={json_hash}"),
        format!("PDF_SHA256={pdf_hash}"),
        "NOTE=Hashes validate integrity and determinism for this period.".to_string(),
    ]
    .join("\n"))
}

/// Parse manifest text into a key/value map
///
/// Lines without `=` are skipped; values may contain `=` (only the first
/// one splits).
pub fn parse_manifest(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
