//! # AER - Adherence Evidence Report compiler
//!
//! This crate compiles clinical adherence records into a deterministic
//! evidence bundle: a JSON report, a paginated PDF rendering of the same
//! facts, and a store-only ZIP archive carrying both plus a plaintext
//! verification manifest with SHA-256 hashes.
//!
//! ## Overview
//!
//! The hard problem is reproducibility, not record access: the same logical
//! inputs must always produce the same bytes, so a hash recorded today can
//! be re-verified years later. Three pure stages guarantee that:
//!
//! - **Aggregate**: merge unordered event streams (assignments,
//!   submissions, feedback, check-ins, notifications) into one totally
//!   ordered timeline with per-task status summaries
//! - **Render**: lay the report onto fixed-size pages with stable
//!   pagination and pinned document timestamps
//! - **Pack**: bundle the artifacts into a byte-exact archive with a
//!   hand-built store-only ZIP writer
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Evidence pipeline (report, render, archive, bundle, rollup,
//!   verification)
//! - [`adapters`] - Event-source abstraction and the snapshot adapter
//! - [`domain`] - Core domain types and the report model
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use aer::adapters::source::SnapshotSource;
//! use aer::core::bundle::BundleBuilder;
//! use aer::core::report::ReportRequest;
//! use aer::domain::period::ReportPeriod;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(SnapshotSource::load(Path::new("snapshot.json")).await?);
//!     let builder = BundleBuilder::new(source);
//!
//!     let request = ReportRequest {
//!         clinic_id: "clinic-1".parse()?,
//!         client_id: "client-1".parse()?,
//!         period: ReportPeriod::from_labels("2026-01-01", "2026-01-31")?,
//!         program: None,
//!         generated_at_override: None,
//!     };
//!
//!     let outcome = builder.generate(&request).await?;
//!     std::fs::write("bundle.zip", &outcome.buffer)?;
//!     println!("{} ({} bytes)", outcome.report_id, outcome.buffer.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Determinism
//!
//! Rebuilding the same period from the same snapshot yields byte-identical
//! artifacts:
//!
//! - timeline and escalation lists are sorted by a fixed total order
//!   (timestamp, then type, then reference id)
//! - the report id is a pure function of the request parameters
//! - `generated_at` is pinned to the period end for archival bundles
//! - PDF document timestamps derive from `generated_at`, never wall clock
//! - the archive writer emits no platform- or time-dependent bytes beyond
//!   the caller-supplied timestamp
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`] with the
//! [`domain::AerError`] taxonomy:
//!
//! ```rust,no_run
//! use aer::domain::AerError;
//!
//! fn example() -> Result<(), AerError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = aer::config::load_config("aer.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!(report_id = "AER-v1:clinic-1:client-1:2026-01-01:2026-01-31", "Report built");
//! warn!(channel = "unknown", "Notification carried no delivery channel");
//! error!(error = ?std::io::Error::other("boom"), "Bundle write failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
