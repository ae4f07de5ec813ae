//! Verification metadata for generated reports
//!
//! Every report embeds a `meta.verification` block naming the standard it
//! conforms to, the hash of the schema it was generated against, and the
//! generator build. The schema ships inside the binary so the hash cannot
//! drift from the code that produced the report.

use crate::core::verification::checksum::sha256_hex;
use crate::domain::report::VerificationMeta;

/// The reporting standard implemented by this generator
pub const STANDARD: &str = "AER_STANDARD_V1";

/// Revision of the standard this generator implements
pub const STANDARD_VERSION: &str = "1.1";

/// Version tag of the companion verification tooling
pub const VERIFICATION_TOOL_VERSION: &str = "verify_aer@1.1";

/// The JSON Schema for the report wire format, embedded at compile time
pub const SCHEMA_JSON: &str = include_str!("../../../docs/aer/AER_STANDARD_V1.schema.json");

/// Build the verification block for a generated report
///
/// The generator commit comes from the `GIT_SHA` environment variable when
/// the build pipeline sets it, and falls back to `dev` otherwise.
pub fn verification_meta() -> VerificationMeta {
    VerificationMeta {
        standard: STANDARD.to_string(),
        standard_version: STANDARD_VERSION.to_string(),
        schema_version: STANDARD.to_string(),
        schema_sha256: schema_sha256(),
        generator_commit: generator_commit(),
        verification_tool_version: VERIFICATION_TOOL_VERSION.to_string(),
    }
}

/// SHA-256 of the embedded schema file
pub fn schema_sha256() -> String {
    sha256_hex(SCHEMA_JSON.as_bytes())
}

fn generator_commit() -> String {
    match std::env::var("GIT_SHA") {
        Ok(sha) if !sha.trim().is_empty() => sha.trim().to_string(),
        _ => "dev".to_string(),
    }
}
