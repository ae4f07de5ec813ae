//! Bundle pipeline
//!
//! Runs the three pure stages end to end for one request: aggregate the
//! report, serialize it to JSON, render the PDF, write the verification
//! manifest, and pack everything into a store-only archive. The only I/O
//! is the aggregator's initial event-source read; everything after is a
//! function of the report value.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::adapters::source::EventSource;
use crate::core::archive::{pack_archive, ArchiveEntry};
use crate::core::bundle::manifest::{build_manifest, JSON_ENTRY, MANIFEST_ENTRY, PDF_ENTRY};
use crate::core::render::render;
use crate::core::report::{EvidenceAggregator, ReportRequest};
use crate::core::verification::sha256_hex;
use crate::domain::Result;

/// Everything produced for one bundle request
#[derive(Debug, Clone)]
pub struct BundleOutcome {
    /// Archive bytes, ready to persist or stream
    pub buffer: Vec<u8>,
    pub report_id: String,
    pub json_hash: String,
    pub pdf_hash: String,
    /// Manifest text, identical to the `verification.txt` entry
    pub verification_text: String,
}

/// Builds evidence bundles end to end
pub struct BundleBuilder {
    aggregator: EvidenceAggregator,
}

impl BundleBuilder {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self {
            aggregator: EvidenceAggregator::new(source),
        }
    }

    /// Generate the archival bundle for one request
    ///
    /// `generated_at` is pinned to the period end unless the request
    /// carries its own override, so re-running the same period over the
    /// same snapshot yields byte-identical archives.
    ///
    /// # Errors
    ///
    /// Propagates aggregation errors (`NotFound`, `Forbidden`, source
    /// failures); the render and pack stages cannot fail on a well-formed
    /// report.
    pub async fn generate(&self, request: &ReportRequest) -> Result<BundleOutcome> {
        let mut request = request.clone();
        request.generated_at_override =
            Some(request.generated_at_override.unwrap_or_else(|| request.period.end()));

        let report = self.aggregator.generate(&request).await?;
        let json = report.to_json_bytes()?;
        let pdf = render(&report)?;

        let json_hash = sha256_hex(&json);
        let pdf_hash = sha256_hex(&pdf);
        let verification_text = build_manifest(&report, &json_hash, &pdf_hash)?;

        let buffer = pack_archive(
            &[
                ArchiveEntry {
                    name: JSON_ENTRY,
                    data: &json,
                },
                ArchiveEntry {
                    name: PDF_ENTRY,
                    data: &pdf,
                },
                ArchiveEntry {
                    name: MANIFEST_ENTRY,
                    data: verification_text.as_bytes(),
                },
            ],
            archive_timestamp(&report.meta.generated_at),
        );

        tracing::info!(
            report_id = %report.audit_integrity.report_id,
            bundle_bytes = buffer.len(),
            json_sha256 = %json_hash,
            pdf_sha256 = %pdf_hash,
            "Bundle assembled"
        );

        Ok(BundleOutcome {
            buffer,
            report_id: report.audit_integrity.report_id.clone(),
            json_hash,
            pdf_hash,
            verification_text,
        })
    }
}

/// Download-style file name for a bundle
pub fn bundle_filename(request: &ReportRequest) -> String {
    format!(
        "AER_BUNDLE_{}_{}_{}_{}.zip",
        request.clinic_id,
        request.client_id,
        request.period.start_label(),
        request.period.end_label()
    )
}

/// Archive entry timestamp, taken from the report's own pinned instant so
/// the ZIP headers stay reproducible
fn archive_timestamp(generated_at: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(generated_at)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
