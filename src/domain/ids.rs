//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for the identifiers that scope a
//! report request, plus the content-addressable report identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clinic identifier newtype wrapper
///
/// Represents the clinic a report is scoped to. Opaque to this tool; the
/// event source owns the format.
///
/// # Examples
///
/// ```
/// use aer::domain::ids::ClinicId;
/// use std::str::FromStr;
///
/// let clinic_id = ClinicId::from_str("clinic-1").unwrap();
/// assert_eq!(clinic_id.as_str(), "clinic-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClinicId(String);

impl ClinicId {
    /// Creates a new ClinicId from a string
    ///
    /// # Arguments
    ///
    /// * `id` - The clinic identifier string
    ///
    /// # Returns
    ///
    /// Returns `Ok(ClinicId)` if the ID is valid, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Clinic ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the clinic ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ClinicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClinicId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ClinicId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Client identifier newtype wrapper
///
/// Represents the client (patient) a report covers. Opaque to this tool.
///
/// # Examples
///
/// ```
/// use aer::domain::ids::ClientId;
/// use std::str::FromStr;
///
/// let client_id = ClientId::from_str("client-1").unwrap();
/// assert_eq!(client_id.as_str(), "client-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new ClientId from a string
    ///
    /// # Arguments
    ///
    /// * `id` - The client identifier string
    ///
    /// # Returns
    ///
    /// Returns `Ok(ClientId)` if the ID is valid, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Client ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the client ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Content-addressable report identifier
///
/// A pure function of the request parameters, never of wall-clock time, so
/// two reports generated for the same logical request share the same id.
/// Format: `AER-v1:{clinic}:{client}:{start}:{end}` with `:{program}`
/// appended when a program filter is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(String);

impl ReportId {
    /// Builds the report id from request parameters
    pub fn build(
        clinic_id: &ClinicId,
        client_id: &ClientId,
        period_start_label: &str,
        period_end_label: &str,
        program: Option<&str>,
    ) -> Self {
        let mut id = format!(
            "AER-v1:{}:{}:{}:{}",
            clinic_id.as_str(),
            client_id.as_str(),
            period_start_label,
            period_end_label
        );
        if let Some(program) = program {
            id.push(':');
            id.push_str(program);
        }
        Self(id)
    }

    /// Returns the report ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ReportId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
