//! External system integrations.
//!
//! This module provides adapters for reading from external systems:
//!
//! - [`source`] - Event-source abstraction layer (trait-based)
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies
//! and enable testing with in-memory implementations. The report builders
//! only ever see the [`source::EventSource`] trait, never a concrete store.
//!
//! # Snapshot Adapter
//!
//! The shipping implementation reads a JSON snapshot export of the system of
//! record:
//!
//! ```rust,no_run
//! use aer::adapters::source::{EventSource, SnapshotSource};
//! use aer::domain::ids::ClinicId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = SnapshotSource::load(std::path::Path::new("snapshot.json")).await?;
//! let clinic_id: ClinicId = "clinic-1".parse()?;
//! let clinic = source.fetch_clinic(&clinic_id).await?;
//! # Ok(())
//! # }
//! ```

pub mod source;
