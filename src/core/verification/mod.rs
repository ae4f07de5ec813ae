//! Artifact verification support
//!
//! This module provides the SHA-256 checksum helper and the verification
//! metadata embedded in every generated report.

pub mod checksum;
pub mod meta;

pub use checksum::sha256_hex;
pub use meta::{schema_sha256, verification_meta};
