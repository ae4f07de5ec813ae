//! Clinic rollup domain model
//!
//! The rollup is the clinic-level companion to the per-client report: one
//! row per client with completion counters and a coarse risk flag, plus
//! clinic-wide totals. Same wire discipline as the report model.

use serde::{Deserialize, Serialize};

/// Report type tag carried in rollup `meta.report_type`
pub const ROLLUP_REPORT_TYPE: &str = "AER_ROLLUP";

/// Clinic-level rollup report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AerRollupReport {
    pub meta: RollupMeta,
    pub summary: RollupSummary,
    pub client_rows: Vec<ClientRow>,
    pub not_available: Vec<String>,
}

impl AerRollupReport {
    /// Serializes the rollup to compact JSON bytes
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupMeta {
    pub report_type: String,
    pub version: String,
    pub generated_at: String,
    pub period: super::report::PeriodLabels,
    pub clinic_id: String,
    pub program: Option<String>,
}

/// Clinic-wide totals across all clients in scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupSummary {
    pub clients_in_scope: u32,
    pub interventions_assigned: u32,
    pub completed: u32,
    pub partial: u32,
    pub missed: u32,
    pub late: u32,
    pub completion_rate: f64,
    pub noncompliance_rate: f64,
}

/// Per-client adherence counters and risk flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRow {
    pub client_id: String,
    pub display_id: Option<String>,
    pub assigned: u32,
    pub completed: u32,
    pub partial: u32,
    pub missed: u32,
    pub late: u32,
    pub completion_rate: f64,
    /// Latest submission or check-in instant in the period
    pub last_activity_at: Option<String>,
    pub risk_flag: RiskFlag,
}

/// Coarse adherence risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    Ok,
    Watch,
    High,
}

impl RiskFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFlag::Ok => "ok",
            RiskFlag::Watch => "watch",
            RiskFlag::High => "high",
        }
    }

    /// Sort rank: highest risk first
    pub fn severity_rank(&self) -> u8 {
        match self {
            RiskFlag::High => 0,
            RiskFlag::Watch => 1,
            RiskFlag::Ok => 2,
        }
    }
}

/// Rounds a ratio to 4 decimal places; 0 when the denominator is 0
pub fn round_rate(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let rate = f64::from(numerator) / f64::from(denominator);
    (rate * 10_000.0).round() / 10_000.0
}
