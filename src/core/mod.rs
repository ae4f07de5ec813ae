//! Core business logic for the AER compiler.
//!
//! This module contains the evidence pipeline and its companion builders.
//!
//! # Modules
//!
//! - [`report`] - Evidence Aggregator: merges event streams into the
//!   canonical report value
//! - [`render`] - Deterministic Document Renderer: report value to PDF bytes
//! - [`archive`] - Archive Packager: store-only ZIP writer and the
//!   verification reader
//! - [`bundle`] - Pipeline coordinator and verification manifest
//! - [`rollup`] - Clinic-level rollup reports
//! - [`verification`] - SHA-256 helpers and embedded verification metadata
//!
//! # Pipeline
//!
//! One bundle request flows through three pure stages:
//!
//! 1. **Aggregate**: fetch adapter rows, assemble the immutable `AerReport`
//! 2. **Render**: lay the report onto fixed-size pages, emit PDF bytes
//! 3. **Pack**: bundle JSON + PDF + manifest into a byte-exact archive
//!
//! The only I/O is the aggregator's initial event-source read; given the
//! same snapshot and request, every stage produces identical bytes.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use aer::adapters::source::SnapshotSource;
//! use aer::core::bundle::BundleBuilder;
//! use aer::core::report::ReportRequest;
//! use aer::domain::period::ReportPeriod;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Arc::new(SnapshotSource::load(Path::new("snapshot.json")).await?);
//! let builder = BundleBuilder::new(source);
//!
//! let request = ReportRequest {
//!     clinic_id: "clinic-1".parse()?,
//!     client_id: "client-1".parse()?,
//!     period: ReportPeriod::from_labels("2026-01-01", "2026-01-31")?,
//!     program: None,
//!     generated_at_override: None,
//! };
//! let outcome = builder.generate(&request).await?;
//! println!("{} ({} bytes)", outcome.report_id, outcome.buffer.len());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod bundle;
pub mod render;
pub mod report;
pub mod rollup;
pub mod verification;
