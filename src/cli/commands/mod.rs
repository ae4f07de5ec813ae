//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod generate;
pub mod init;
pub mod rollup;
pub mod validate;
pub mod verify;

use crate::domain::AerError;

/// Map an error to the process exit code
///
/// 2 for configuration problems, 4 for verification failures, 5 for
/// everything else.
pub(crate) fn exit_code_for(err: &AerError) -> i32 {
    match err {
        AerError::Configuration(_) => 2,
        AerError::Verification(_) => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(exit_code_for(&AerError::Configuration("x".into())), 2);
        assert_eq!(exit_code_for(&AerError::Verification("x".into())), 4);
        assert_eq!(exit_code_for(&AerError::NotFound("x".into())), 5);
        assert_eq!(exit_code_for(&AerError::InvalidRange("x".into())), 5);
    }
}
