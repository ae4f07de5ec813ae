//! Domain error types
//!
//! This module defines the error hierarchy for the AER compiler.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main AER error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum AerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Event-source adapter errors
    #[error("Event source error: {0}")]
    Source(#[from] SourceError),

    /// Clinic or client absent from the event source
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client does not belong to the requested clinic
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed date labels or inverted reporting period
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Document renderer errors (defensive)
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Archive read/parse errors
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Bundle verification failures
    #[error("Verification failed: {0}")]
    Verification(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Event-source adapter errors
///
/// Errors raised while reading rows from the configured event source.
/// These errors don't expose the adapter's underlying file or driver types.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read the snapshot file
    #[error("Failed to read snapshot: {0}")]
    SnapshotRead(String),

    /// Snapshot contents are not valid JSON
    #[error("Failed to parse snapshot: {0}")]
    SnapshotParse(String),

    /// A required row collection is absent from the snapshot
    #[error("Snapshot is missing collection: {0}")]
    MissingCollection(String),

    /// A row failed field-level validation
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Configured source kind has no adapter
    #[error("Unsupported source kind: {0}")]
    UnsupportedKind(String),
}

/// Document renderer errors
///
/// The renderer is a pure function of the report value; these variants only
/// fire on malformed input the aggregator never produces.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A table row carried the wrong number of cells
    #[error("Table row has {actual} cells, expected {expected}")]
    ColumnMismatch { expected: usize, actual: usize },

    /// Table columns exceed the printable width
    #[error("Table width {width} exceeds content width {available}")]
    TableTooWide { width: f64, available: f64 },
}

/// Archive read-side errors
///
/// Raised when parsing a bundle produced by this tool (or any ZIP 2.0
/// store-only archive) for verification.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// No end-of-central-directory record in the trailing window
    #[error("End of central directory not found")]
    MissingEndOfDirectory,

    /// Entry uses a compression method the reader does not support
    #[error("Unsupported compression method {method} for {name}")]
    UnsupportedCompression { name: String, method: u16 },

    /// Local header signature did not match
    #[error("Invalid local header for {0}")]
    InvalidLocalHeader(String),

    /// Record extends past the end of the buffer
    #[error("Archive truncated: {0}")]
    Truncated(String),

    /// A required bundle entry is absent
    #[error("Archive is missing entry: {0}")]
    MissingEntry(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for AerError {
    fn from(err: std::io::Error) -> Self {
        AerError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AerError {
    fn from(err: serde_json::Error) -> Self {
        AerError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AerError {
    fn from(err: toml::de::Error) -> Self {
        AerError::Configuration(format!("TOML parse error: {err}"))
    }
}
