//! Canonical report assembly.
//!
//! The [`aggregator`] merges unordered event streams into the immutable
//! [`AerReport`](crate::domain::report::AerReport) value that the renderer
//! and packager consume. Everything order-sensitive is settled here; the
//! downstream stages are pure functions of the assembled value.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use aer::adapters::source::SnapshotSource;
//! use aer::core::report::{EvidenceAggregator, ReportRequest};
//! use aer::domain::period::ReportPeriod;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Arc::new(SnapshotSource::load(Path::new("snapshot.json")).await?);
//! let aggregator = EvidenceAggregator::new(source);
//!
//! let request = ReportRequest {
//!     clinic_id: "clinic-1".parse()?,
//!     client_id: "client-1".parse()?,
//!     period: ReportPeriod::from_labels("2026-01-01", "2026-01-31")?,
//!     program: None,
//!     generated_at_override: None,
//! };
//! let report = aggregator.generate(&request).await?;
//! println!("{}", report.audit_integrity.report_id);
//! # Ok(())
//! # }
//! ```

pub mod aggregator;

pub use aggregator::{EvidenceAggregator, ReportRequest};
