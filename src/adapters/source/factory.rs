//! Event-source factory
//!
//! This module provides factory functions to create event sources based on
//! configuration.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::source::snapshot::SnapshotSource;
use crate::adapters::source::traits::EventSource;
use crate::config::schema::AerConfig;
use crate::domain::errors::SourceError;
use crate::domain::Result;

/// Create an event source based on the configuration
///
/// This factory function examines `source.kind` in the configuration and
/// creates the matching adapter.
///
/// # Errors
///
/// Returns an error when the configured kind has no adapter or the source
/// cannot be opened.
pub async fn create_event_source(config: &AerConfig) -> Result<Arc<dyn EventSource>> {
    match config.source.kind.as_str() {
        "snapshot" => {
            tracing::info!(
                path = %config.source.snapshot_path,
                "Creating snapshot event source"
            );
            let source = SnapshotSource::load(Path::new(&config.source.snapshot_path)).await?;
            Ok(Arc::new(source) as Arc<dyn EventSource>)
        }
        other => Err(SourceError::UnsupportedKind(other.to_string()).into()),
    }
}
