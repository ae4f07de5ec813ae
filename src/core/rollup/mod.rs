//! Clinic-level rollup reports.
//!
//! The rollup is the clinic-wide companion to the per-client evidence
//! report: per-client adherence counters, a coarse risk flag, and clinic
//! totals for one period. Built by [`RollupBuilder`] from the same event
//! source and the same touched-in-period rules as the per-client report.

pub mod builder;

pub use builder::{RollupBuilder, RollupRequest, DEFAULT_CLIENT_LIMIT, MAX_CLIENT_LIMIT};
