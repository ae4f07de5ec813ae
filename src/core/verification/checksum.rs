//! Checksum calculation for artifact verification
//!
//! This module provides the SHA-256 helper used for the verification
//! manifest, the embedded-schema hash, and bundle verification. Hashes are
//! always taken over the exact artifact bytes, never over re-serialized
//! values, so a hash match proves byte identity.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 checksum of raw bytes
///
/// # Arguments
///
/// * `data` - The raw bytes to calculate the checksum for
///
/// # Returns
///
/// Returns a hex-encoded SHA-256 checksum string (64 lowercase characters).
///
/// # Examples
///
/// ```
/// use aer::core::verification::checksum::sha256_hex;
///
/// let checksum = sha256_hex(b"Hello, World!");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{result:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_value() {
        // Published SHA-256 of the empty input.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        let checksum1 = sha256_hex(b"Test data");
        let checksum2 = sha256_hex(b"Test data");
        assert_eq!(checksum1, checksum2);
    }

    #[test]
    fn test_sha256_hex_different_content() {
        assert_ne!(sha256_hex(b"a"), sha256_hex(b"b"));
    }

    #[test]
    fn test_sha256_hex_format() {
        let checksum = sha256_hex(b"abc");
        assert_eq!(checksum.len(), 64);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(checksum, checksum.to_lowercase());
    }
}
