//! Event-source abstraction layer
//!
//! This module provides a trait-based abstraction over the system of record,
//! allowing the report builders to work against any backing store. The
//! shipping implementation reads a JSON snapshot export, which keeps report
//! generation fully deterministic.

pub mod factory;
pub mod rows;
pub mod snapshot;
pub mod traits;

pub use factory::create_event_source;
pub use snapshot::{SnapshotData, SnapshotSource};
pub use traits::EventSource;
