//! Deterministic PDF rendering for adherence reports.
//!
//! This module turns an assembled report into PDF bytes as a pure function
//! of the report value. Rendering runs in three passes:
//!
//! 1. **Layout** ([`layout::build_pages`]) - measure and place every text
//!    block into per-page command lists, breaking pages against the footer
//!    band
//! 2. **Footer** ([`layout::stamp_footers`]) - stamp `Report ID | Page n of
//!    total` on each page once the total count is known
//! 3. **Emit** ([`emit::emit_pdf`]) - serialize the command lists into an
//!    uncompressed PDF 1.4 file
//!
//! Font measurement uses built-in Helvetica metrics ([`metrics`]) and text
//! outside the printable ASCII range is replaced before measuring, so the
//! same report value always renders to the same bytes on any host.
//!
//! # Example
//!
//! ```rust,no_run
//! use aer::core::render::render;
//! # fn example(report: &aer::domain::report::AerReport) -> aer::domain::Result<()> {
//! let pdf = render(report)?;
//! assert!(pdf.starts_with(b"%PDF-1.4"));
//! # Ok(())
//! # }
//! ```

pub mod emit;
pub mod layout;
pub mod metrics;
pub mod wrap;

use crate::domain::report::AerReport;
use crate::domain::Result;

/// Render a report to PDF bytes
///
/// # Errors
///
/// Returns an error if a table layout is internally inconsistent (mismatched
/// column count or columns wider than the content area). Well-formed reports
/// never hit these.
pub fn render(report: &AerReport) -> Result<Vec<u8>> {
    let mut pages = layout::build_pages(report)?;
    layout::stamp_footers(&mut pages, &report.audit_integrity.report_id);
    Ok(emit::emit_pdf(&pages, &report.meta.generated_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::{
        AerReport, AuditIntegrity, ClientContext, ClinicContext, ClinicianReview, GeneratedBy,
        PeriodLabels, PersonRef, ReportContext, ReportMeta, VerificationMeta,
    };

    fn report() -> AerReport {
        AerReport {
            meta: ReportMeta {
                report_type: "AER".to_string(),
                version: "v1".to_string(),
                generated_at: "2026-01-31T23:59:59.999Z".to_string(),
                period: PeriodLabels {
                    start: "2026-01-01".to_string(),
                    end: "2026-01-31".to_string(),
                },
                clinic_id: "clinic-1".to_string(),
                client_id: "client-1".to_string(),
                program: None,
                generated_by: GeneratedBy {
                    kind: "system".to_string(),
                    id: "backend".to_string(),
                },
                verification: VerificationMeta {
                    standard: "AER_STANDARD_V1".to_string(),
                    standard_version: "1.1".to_string(),
                    schema_version: "AER_STANDARD_V1".to_string(),
                    schema_sha256: "0".repeat(64),
                    generator_commit: "dev".to_string(),
                    verification_tool_version: "verify_aer@1.1".to_string(),
                },
            },
            context: ReportContext {
                clinic: ClinicContext { name: None },
                client: ClientContext { display_id: None },
            },
            prescribed_interventions: Vec::new(),
            adherence_timeline: Vec::new(),
            noncompliance_escalations: Vec::new(),
            clinician_review: ClinicianReview {
                reviewed: false,
                reviewed_at: None,
                reviewed_by: PersonRef {
                    user_id: None,
                    name: None,
                },
                notes: None,
            },
            audit_integrity: AuditIntegrity {
                data_sources: vec!["snapshot".to_string()],
                notes: "This report is generated from system-of-record event data where available."
                    .to_string(),
                report_id: "AER-v1:clinic-1:client-1:2026-01-01:2026-01-31".to_string(),
                hash: None,
            },
            not_available: Vec::new(),
        }
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let pdf = render(&report()).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.len() > 500);
    }

    #[test]
    fn test_render_is_deterministic() {
        let report = report();
        let a = render(&report).unwrap();
        let b = render(&report).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_footer_carries_report_id() {
        let pdf = render(&report()).unwrap();
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("(Report ID: AER-v1:clinic-1:client-1:2026-01-01:2026-01-31 | Page 1 of 1) Tj"));
    }
}
