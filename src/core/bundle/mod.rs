//! Evidence bundle assembly.
//!
//! The [`pipeline`] runs the three pure stages end to end (aggregate,
//! render, pack) and the [`manifest`] module owns the plaintext
//! `verification.txt` format shipped inside every bundle.

pub mod manifest;
pub mod pipeline;

pub use manifest::{build_manifest, parse_manifest, JSON_ENTRY, MANIFEST_ENTRY, PDF_ENTRY};
pub use pipeline::{bundle_filename, BundleBuilder, BundleOutcome};
