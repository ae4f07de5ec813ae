//! Domain models and types for the AER compiler.
//!
//! This module contains the core domain models, types, and business rules.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ClinicId`], [`ClientId`], [`ReportId`])
//! - **The report model** ([`AerReport`] and its wire-contract sub-types)
//! - **The rollup model** ([`AerRollupReport`])
//! - **Period handling** ([`ReportPeriod`])
//! - **Error types** ([`AerError`] and its sub-enums) and the [`Result`] alias
//!
//! # Type Safety
//!
//! Identifiers use the newtype pattern so a clinic id cannot be passed where
//! a client id is expected:
//!
//! ```rust
//! use aer::domain::{ClinicId, ClientId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let clinic_id = ClinicId::new("clinic-1")?;
//! let client_id = ClientId::new("client-1")?;
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: ClinicId = client_id;  // Compile error!
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, AerError>`]:
//!
//! ```rust
//! use aer::domain::{ReportPeriod, Result};
//!
//! fn example() -> Result<()> {
//!     let period = ReportPeriod::from_labels("2026-01-01", "2026-01-31")?;
//!     assert_eq!(period.start_label(), "2026-01-01");
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod period;
pub mod report;
pub mod result;
pub mod rollup;

// Re-export commonly used types for convenience
pub use errors::{AerError, ArchiveError, RenderError, SourceError};
pub use ids::{ClientId, ClinicId, ReportId};
pub use period::ReportPeriod;
pub use report::AerReport;
pub use result::Result;
pub use rollup::AerRollupReport;
