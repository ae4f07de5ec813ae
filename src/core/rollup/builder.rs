//! Clinic rollup assembly
//!
//! Aggregates one period of adherence activity across every client in a
//! clinic into per-client counters and clinic-wide totals. Reuses the same
//! touched-in-period assignment semantics as the per-client report, so a
//! client's rollup row and their individual report never disagree on what
//! counted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::adapters::source::rows::SubmissionRow;
use crate::adapters::source::EventSource;
use crate::domain::errors::AerError;
use crate::domain::ids::ClinicId;
use crate::domain::period::{format_instant, ReportPeriod};
use crate::domain::report::PeriodLabels;
use crate::domain::rollup::{
    round_rate, AerRollupReport, ClientRow, RiskFlag, RollupMeta, RollupSummary,
    ROLLUP_REPORT_TYPE,
};
use crate::domain::Result;

/// Default number of client rows returned when the caller does not say
pub const DEFAULT_CLIENT_LIMIT: usize = 100;

/// Hard cap on returned client rows
pub const MAX_CLIENT_LIMIT: usize = 500;

/// Parameters of one rollup request
#[derive(Debug, Clone)]
pub struct RollupRequest {
    pub clinic_id: ClinicId,
    pub period: ReportPeriod,
    pub program: Option<String>,
    /// Maximum client rows in the result; totals always cover every client
    pub limit: usize,
    /// Accepted but unimplemented in v1; declared via `not_available`
    pub cursor: Option<String>,
    pub generated_at_override: Option<DateTime<Utc>>,
}

/// Builds clinic-level rollup reports from an event source
pub struct RollupBuilder {
    source: Arc<dyn EventSource>,
}

impl RollupBuilder {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self { source }
    }

    /// Build the rollup for one clinic and period
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the clinic does not exist; event-source errors
    /// propagate unchanged.
    pub async fn generate(&self, request: &RollupRequest) -> Result<AerRollupReport> {
        tracing::info!(
            clinic_id = %request.clinic_id,
            period_start = request.period.start_label(),
            period_end = request.period.end_label(),
            limit = request.limit,
            "Generating clinic rollup"
        );

        let mut not_available: Vec<String> = Vec::new();
        if request.program.is_some() {
            add_entry(
                &mut not_available,
                "program filter (no program field to filter assignments/clients)",
            );
        }
        if request.cursor.is_some() {
            add_entry(&mut not_available, "pagination cursor not implemented in v1");
        }
        add_entry(
            &mut not_available,
            "client_rows.display_id (no display_id in clients table)",
        );
        add_entry(
            &mut not_available,
            "partial completion (no partial completion model)",
        );

        self.source
            .fetch_clinic(&request.clinic_id)
            .await?
            .ok_or_else(|| AerError::NotFound("Clinic not found".to_string()))?;

        let clients = self.source.fetch_clients(&request.clinic_id).await?;
        let assignments = self
            .source
            .fetch_clinic_assignments(&request.clinic_id, &request.period)
            .await?;
        let submissions = self
            .source
            .fetch_clinic_submissions(&request.clinic_id, &request.period)
            .await?;
        let checkins = self
            .source
            .fetch_clinic_checkins(&request.clinic_id, &request.period)
            .await?;

        tracing::debug!(
            clients = clients.len(),
            assignments = assignments.len(),
            submissions = submissions.len(),
            checkins = checkins.len(),
            "Fetched clinic streams"
        );

        let mut submissions_by_assignment: HashMap<&str, Vec<&SubmissionRow>> = HashMap::new();
        let mut last_activity: HashMap<&str, DateTime<Utc>> = HashMap::new();
        for submission in &submissions {
            submissions_by_assignment
                .entry(submission.assignment_id.as_str())
                .or_default()
                .push(submission);
            update_last_activity(&mut last_activity, &submission.client_id, submission.created_at);
        }
        for checkin in &checkins {
            update_last_activity(&mut last_activity, &checkin.client_id, checkin.created_at);
        }

        let mut stats: HashMap<&str, ClientRow> = clients
            .iter()
            .map(|client| {
                (
                    client.id.as_str(),
                    ClientRow {
                        client_id: client.id.clone(),
                        display_id: None,
                        assigned: 0,
                        completed: 0,
                        partial: 0,
                        missed: 0,
                        late: 0,
                        completion_rate: 0.0,
                        last_activity_at: None,
                        risk_flag: RiskFlag::Ok,
                    },
                )
            })
            .collect();

        let period_end = request.period.end();
        for assignment in &assignments {
            let Some(row) = stats.get_mut(assignment.client_id.as_str()) else {
                continue;
            };
            row.assigned += 1;

            let responses = submissions_by_assignment
                .get(assignment.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            if responses.is_empty() {
                if assignment.due_date.is_some_and(|due| due <= period_end) {
                    row.missed += 1;
                }
                continue;
            }

            row.completed += 1;
            let earliest = responses.iter().min_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            });
            if let (Some(due), Some(earliest)) = (assignment.due_date, earliest) {
                if earliest.created_at > due {
                    row.late += 1;
                }
            }
        }

        let mut missing_risk_inputs = false;
        for row in stats.values_mut() {
            row.completion_rate = round_rate(row.completed, row.assigned);
            row.last_activity_at = last_activity
                .get(row.client_id.as_str())
                .map(|at| format_instant(*at));
            row.risk_flag = classify_risk(row);
            if row.assigned == 0 {
                missing_risk_inputs = true;
            }
        }
        if missing_risk_inputs {
            add_entry(
                &mut not_available,
                "risk_flag (insufficient data: no assigned interventions)",
            );
        }

        let totals = stats.values().fold((0u32, 0u32, 0u32, 0u32, 0u32), |acc, row| {
            (
                acc.0 + row.assigned,
                acc.1 + row.completed,
                acc.2 + row.partial,
                acc.3 + row.missed,
                acc.4 + row.late,
            )
        });
        let (assigned, completed, partial, missed, late) = totals;

        let mut client_rows: Vec<ClientRow> = stats.into_values().collect();
        client_rows.sort_by(|a, b| {
            a.risk_flag
                .severity_rank()
                .cmp(&b.risk_flag.severity_rank())
                .then_with(|| a.completion_rate.total_cmp(&b.completion_rate))
                .then_with(|| a.client_id.cmp(&b.client_id))
        });
        client_rows.truncate(request.limit);

        let generated_at = request
            .generated_at_override
            .map_or_else(|| format_instant(Utc::now()), format_instant);

        Ok(AerRollupReport {
            meta: RollupMeta {
                report_type: ROLLUP_REPORT_TYPE.to_string(),
                version: "v1".to_string(),
                generated_at,
                period: PeriodLabels {
                    start: request.period.start_label().to_string(),
                    end: request.period.end_label().to_string(),
                },
                clinic_id: request.clinic_id.as_str().to_string(),
                program: request.program.clone(),
            },
            summary: RollupSummary {
                clients_in_scope: clients.len() as u32,
                interventions_assigned: assigned,
                completed,
                partial,
                missed,
                late,
                completion_rate: round_rate(completed, assigned),
                noncompliance_rate: round_rate(missed + late, assigned),
            },
            client_rows,
            not_available,
        })
    }
}

fn add_entry(list: &mut Vec<String>, entry: &str) {
    if !list.iter().any(|existing| existing == entry) {
        list.push(entry.to_string());
    }
}

fn update_last_activity<'a>(
    last_activity: &mut HashMap<&'a str, DateTime<Utc>>,
    client_id: &'a str,
    at: DateTime<Utc>,
) {
    let entry = last_activity.entry(client_id).or_insert(at);
    if at > *entry {
        *entry = at;
    }
}

/// Risk rules, evaluated after rates are final
///
/// A client with nothing assigned stays `Ok`; the caller separately records
/// that risk inputs were insufficient.
fn classify_risk(row: &ClientRow) -> RiskFlag {
    if row.assigned == 0 {
        RiskFlag::Ok
    } else if row.missed >= 2 || row.completion_rate < 0.5 {
        RiskFlag::High
    } else if row.missed == 1 || row.completion_rate < 0.75 {
        RiskFlag::Watch
    } else {
        RiskFlag::Ok
    }
}
