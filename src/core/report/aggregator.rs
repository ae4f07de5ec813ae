//! Evidence aggregation - builds the canonical adherence report
//!
//! Merges the disjoint event streams returned by an event source
//! (assignments, submissions, clinician feedback, check-ins, notifications)
//! into one immutable [`AerReport`] value. The report is the single source
//! of truth for everything downstream: the JSON artifact serializes it
//! as-is and the PDF renderer draws from the same value.
//!
//! Ordering is applied here exactly once, after all streams are merged,
//! using the total keys on [`TimelineEvent`] and the escalation reference
//! tie-break. Source-query ordering is never trusted; adapters only
//! guarantee primary-key order.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::adapters::source::rows::{
    AssignmentRow, CheckinRow, FeedbackRow, LatestReview, NotificationRow, PersonRow,
    SubmissionRow,
};
use crate::adapters::source::EventSource;
use crate::core::verification::verification_meta;
use crate::domain::errors::AerError;
use crate::domain::ids::{ClientId, ClinicId, ReportId};
use crate::domain::period::{format_instant, format_instant_opt, ReportPeriod};
use crate::domain::report::{
    AerReport, AuditIntegrity, ClientContext, ClinicContext, ClinicianReview, DueWindow,
    EscalationChannel, EscalationDetails, EscalationEvent, EscalationKind, EventOrigin, EventRef,
    GeneratedBy, LibrarySource, PeriodLabels, PersonRef, PrescribedIntervention, ReportContext,
    ReportMeta, StatusSummary, TimelineDetails, TimelineEvent, TimelineEventKind,
};
use crate::domain::Result;

/// Notification kinds that count as adherence reminders
const REMINDER_KINDS: [&str; 2] = ["assignment_due_24h", "assignment_manual_reminder"];

const AUDIT_NOTES: &str =
    "This report is generated from system-of-record event data where available.";

/// Parameters of one report request
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub clinic_id: ClinicId,
    pub client_id: ClientId,
    pub period: ReportPeriod,
    pub program: Option<String>,
    /// Pins `meta.generated_at` to a fixed instant; `None` uses the wall
    /// clock and is only suitable for live, non-archival calls
    pub generated_at_override: Option<DateTime<Utc>>,
}

/// Builds adherence evidence reports from an event source
pub struct EvidenceAggregator {
    source: Arc<dyn EventSource>,
}

impl EvidenceAggregator {
    /// Create a new aggregator over the given event source
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self { source }
    }

    /// Build the canonical report for one request
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the clinic or client does not exist,
    /// `Forbidden` if the client is not under the requested clinic, and
    /// propagates event-source errors unchanged.
    pub async fn generate(&self, request: &ReportRequest) -> Result<AerReport> {
        tracing::info!(
            clinic_id = %request.clinic_id,
            client_id = %request.client_id,
            period_start = request.period.start_label(),
            period_end = request.period.end_label(),
            "Generating adherence evidence report"
        );

        let mut not_available = NotAvailable::default();
        if request.program.is_some() {
            not_available.add("program filter (no program field to filter assignments/clients)");
        }

        let clinic = self
            .source
            .fetch_clinic(&request.clinic_id)
            .await?
            .ok_or_else(|| AerError::NotFound("Clinic not found".to_string()))?;
        let client = self
            .source
            .fetch_client(&request.client_id)
            .await?
            .ok_or_else(|| AerError::NotFound("Client not found".to_string()))?;
        if client.clinic_id != request.clinic_id.as_str() {
            return Err(AerError::Forbidden(
                "Client does not belong to clinic".to_string(),
            ));
        }

        let assignments = self
            .source
            .fetch_assignments(&request.clinic_id, &request.client_id, &request.period)
            .await?;
        let submissions = self
            .source
            .fetch_submissions(&request.clinic_id, &request.client_id, &request.period)
            .await?;
        let feedback = self
            .source
            .fetch_feedback(&request.clinic_id, &request.client_id, &request.period)
            .await?;
        let checkins = self
            .source
            .fetch_checkins(&request.client_id, &request.period)
            .await?;
        let notifications = self
            .source
            .fetch_notifications(&client.user_id, &request.period)
            .await?;
        let latest_review = self
            .source
            .fetch_latest_review(&request.clinic_id, &request.client_id, &request.period)
            .await?;

        tracing::debug!(
            assignments = assignments.len(),
            submissions = submissions.len(),
            feedback = feedback.len(),
            checkins = checkins.len(),
            notifications = notifications.len(),
            "Fetched event streams"
        );

        not_available.add("context.client.display_id (no display_id in clients table)");
        not_available
            .add("prescribed_interventions.completion_criteria (no field in assignments/prompts)");
        not_available
            .add("prescribed_interventions.status_summary.partial (no partial completion model)");
        not_available.add("clinician_review.notes (no review notes model)");
        let channel_recorded = notifications
            .iter()
            .any(|n| escalation_kind(&n.kind).is_some() && n.channel.is_some());
        if !channel_recorded {
            not_available.add("noncompliance_escalations.channel (delivery channel not stored)");
        }
        not_available.add("audit_integrity.hash (not implemented in v1)");

        let report_id = ReportId::build(
            &request.clinic_id,
            &request.client_id,
            request.period.start_label(),
            request.period.end_label(),
            request.program.as_deref(),
        );

        let submissions_by_assignment = group_by_assignment(&submissions);
        let prescribed_interventions = build_interventions(
            &assignments,
            &submissions_by_assignment,
            request.period.end(),
        );

        let assignments_by_id: HashMap<&str, &AssignmentRow> =
            assignments.iter().map(|a| (a.id.as_str(), a)).collect();
        let adherence_timeline = build_timeline(
            &assignments_by_id,
            &prescribed_interventions,
            &submissions,
            &checkins,
            &feedback,
            &notifications,
        );
        let noncompliance_escalations = build_escalations(&notifications);

        let generated_at = request
            .generated_at_override
            .map_or_else(|| format_instant(Utc::now()), format_instant);

        Ok(AerReport {
            meta: ReportMeta {
                report_type: "AER".to_string(),
                version: "v1".to_string(),
                generated_at,
                period: PeriodLabels {
                    start: request.period.start_label().to_string(),
                    end: request.period.end_label().to_string(),
                },
                clinic_id: request.clinic_id.as_str().to_string(),
                client_id: request.client_id.as_str().to_string(),
                program: request.program.clone(),
                generated_by: GeneratedBy {
                    kind: "system".to_string(),
                    id: "backend".to_string(),
                },
                verification: verification_meta(),
            },
            context: ReportContext {
                clinic: ClinicContext { name: clinic.name },
                client: ClientContext { display_id: None },
            },
            prescribed_interventions,
            adherence_timeline,
            noncompliance_escalations,
            clinician_review: build_clinician_review(latest_review),
            audit_integrity: AuditIntegrity {
                data_sources: vec![self.source.source_tag().to_string()],
                notes: AUDIT_NOTES.to_string(),
                report_id: report_id.into_inner(),
                hash: None,
            },
            not_available: not_available.into_entries(),
        })
    }
}

/// Ordered, de-duplicated list of fields the source cannot supply
#[derive(Debug, Default)]
struct NotAvailable(Vec<String>);

impl NotAvailable {
    fn add(&mut self, entry: &str) {
        if !self.0.iter().any(|existing| existing == entry) {
            self.0.push(entry.to_string());
        }
    }

    fn into_entries(self) -> Vec<String> {
        self.0
    }
}

fn person_ref(person: Option<&PersonRow>) -> PersonRef {
    match person {
        Some(person) => PersonRef {
            user_id: Some(person.user_id.clone()),
            name: Some(person.full_name.clone()),
        },
        None => PersonRef::empty(),
    }
}

fn group_by_assignment(submissions: &[SubmissionRow]) -> HashMap<&str, Vec<&SubmissionRow>> {
    let mut grouped: HashMap<&str, Vec<&SubmissionRow>> = HashMap::new();
    for submission in submissions {
        grouped
            .entry(submission.assignment_id.as_str())
            .or_default()
            .push(submission);
    }
    grouped
}

/// One intervention entry per assignment touched in the period
///
/// The first submission by `(created_at, id)` is the completing event; the
/// last reviewed submission by `(reviewed_at, id)` supplies the review
/// fields. An assignment is missed only when it has zero submissions and
/// its due date is on or before the period end; a pending task with a
/// future due date is neither completed nor missed.
fn build_interventions(
    assignments: &[AssignmentRow],
    submissions_by_assignment: &HashMap<&str, Vec<&SubmissionRow>>,
    period_end: DateTime<Utc>,
) -> Vec<PrescribedIntervention> {
    assignments
        .iter()
        .map(|assignment| {
            let assigned_at = assignment.published_at.unwrap_or(assignment.created_at);

            let mut responses: Vec<&SubmissionRow> = submissions_by_assignment
                .get(assignment.id.as_str())
                .cloned()
                .unwrap_or_default();
            responses.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            });
            let first = responses.first();
            let latest_review = responses
                .iter()
                .filter(|r| r.reviewed_at.is_some())
                .max_by(|a, b| {
                    a.reviewed_at
                        .cmp(&b.reviewed_at)
                        .then_with(|| a.id.cmp(&b.id))
                });

            let completed = u32::from(!responses.is_empty());
            let late = match (assignment.due_date, first) {
                (Some(due), Some(first)) => u32::from(first.created_at > due),
                _ => 0,
            };
            let missed = u32::from(
                responses.is_empty()
                    && assignment.due_date.is_some_and(|due| due <= period_end),
            );

            PrescribedIntervention {
                assignment_id: assignment.id.clone(),
                title: assignment
                    .title
                    .clone()
                    .or_else(|| assignment.prompt_title.clone()),
                library_source: library_source(assignment),
                assigned_by: person_ref(assignment.therapist.as_ref()),
                assigned_at: Some(format_instant(assigned_at)),
                due: DueWindow {
                    start: Some(format_instant(assigned_at)),
                    end: format_instant_opt(assignment.due_date),
                },
                completion_criteria: None,
                completed_at: format_instant_opt(first.map(|r| r.created_at)),
                reviewed_at: format_instant_opt(latest_review.and_then(|r| r.reviewed_at)),
                reviewed_by: person_ref(latest_review.and_then(|r| r.reviewed_by.as_ref())),
                evidence_refs: responses.iter().map(|r| r.id.clone()).collect(),
                status_summary: StatusSummary {
                    completed,
                    partial: 0,
                    missed,
                    late,
                },
            }
        })
        .collect()
}

/// Content-library provenance, present only for library-sourced assignments
///
/// Assigned-time fields win over the live library fields so the report
/// reflects what the client actually received.
fn library_source(assignment: &AssignmentRow) -> Option<LibrarySource> {
    assignment.library_item_id.as_ref().map(|item_id| LibrarySource {
        item_id: item_id.clone(),
        version_id: assignment.library_item_version_id.clone(),
        version: assignment
            .library_assigned_version_number
            .or(assignment.library_item_version),
        title: assignment
            .library_assigned_title
            .clone()
            .or_else(|| assignment.library_source_title.clone()),
        slug: assignment
            .library_assigned_slug
            .clone()
            .or_else(|| assignment.library_source_slug.clone()),
        content_type: assignment.library_source_content_type.clone(),
        status: "PUBLISHED".to_string(),
    })
}

/// Merge all event streams into one timeline
///
/// Every missed intervention contributes a synthetic `assignment_missed`
/// event stamped at its due date, so the timeline shows the omission at
/// the moment it became a fact.
fn build_timeline(
    assignments_by_id: &HashMap<&str, &AssignmentRow>,
    interventions: &[PrescribedIntervention],
    submissions: &[SubmissionRow],
    checkins: &[CheckinRow],
    feedback: &[FeedbackRow],
    notifications: &[NotificationRow],
) -> Vec<TimelineEvent> {
    let mut events = Vec::with_capacity(
        submissions.len() + checkins.len() + feedback.len() + notifications.len(),
    );

    for submission in submissions {
        let late = assignments_by_id
            .get(submission.assignment_id.as_str())
            .and_then(|a| a.due_date)
            .is_some_and(|due| submission.created_at > due);
        events.push(TimelineEvent {
            ts: format_instant(submission.created_at),
            kind: TimelineEventKind::AssignmentCompleted,
            source: EventOrigin::Client,
            reference: EventRef {
                assignment_id: Some(submission.assignment_id.clone()),
                response_id: Some(submission.id.clone()),
            },
            details: TimelineDetails::Submission {
                mood: submission.mood,
                reviewed_at: format_instant_opt(submission.reviewed_at),
                flagged_at: format_instant_opt(submission.flagged_at),
                starred_at: format_instant_opt(submission.starred_at),
                late,
            },
        });
    }

    for checkin in checkins {
        events.push(TimelineEvent {
            ts: format_instant(checkin.created_at),
            kind: TimelineEventKind::Checkin,
            source: EventOrigin::Client,
            reference: EventRef::none(),
            details: TimelineDetails::Checkin {
                checkin_id: checkin.id.clone(),
                mood: checkin.mood,
            },
        });
    }

    for entry in feedback {
        events.push(TimelineEvent {
            ts: format_instant(entry.created_at),
            kind: TimelineEventKind::Feedback,
            source: EventOrigin::Clinician,
            reference: EventRef {
                assignment_id: Some(entry.assignment_id.clone()),
                response_id: Some(entry.response_id.clone()),
            },
            details: TimelineDetails::Feedback {
                therapist_user_id: entry.therapist.as_ref().map(|t| t.user_id.clone()),
                therapist_name: entry.therapist.as_ref().map(|t| t.full_name.clone()),
            },
        });
    }

    for notification in notifications {
        events.push(TimelineEvent {
            ts: format_instant(notification.created_at),
            kind: TimelineEventKind::NotificationSent,
            source: EventOrigin::System,
            reference: EventRef {
                assignment_id: parse_assignment_ref(notification.dedupe_key.as_deref()),
                response_id: None,
            },
            details: TimelineDetails::Notification {
                notification_type: notification.kind.clone(),
            },
        });
    }

    for intervention in interventions {
        if intervention.status_summary.missed != 1 {
            continue;
        }
        let due_date = assignments_by_id
            .get(intervention.assignment_id.as_str())
            .and_then(|a| a.due_date);
        if let Some(due) = due_date {
            events.push(TimelineEvent {
                ts: format_instant(due),
                kind: TimelineEventKind::AssignmentMissed,
                source: EventOrigin::System,
                reference: EventRef::assignment(intervention.assignment_id.clone()),
                details: TimelineDetails::Missed {
                    reason: "no_response_by_due_date".to_string(),
                },
            });
        }
    }

    // The only ordering pass over the merged streams.
    events.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    events
}

/// Reminder and escalation events filtered out of the notification stream
fn build_escalations(notifications: &[NotificationRow]) -> Vec<EscalationEvent> {
    let mut escalations: Vec<EscalationEvent> = notifications
        .iter()
        .filter_map(|n| {
            let kind = escalation_kind(&n.kind)?;
            Some(EscalationEvent {
                ts: format_instant(n.created_at),
                kind,
                channel: EscalationChannel::parse(n.channel.as_deref()),
                details: EscalationDetails {
                    notification_type: n.kind.clone(),
                    assignment_id: parse_assignment_ref(n.dedupe_key.as_deref()),
                },
            })
        })
        .collect();

    // Same (ts, type, channel) order the renderer uses for its table.
    escalations.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    escalations
}

/// Classifies a notification kind tag; `None` drops the row
///
/// The two reminder tags map to `reminder`; any tag carrying `escalation`
/// maps to `escalation`. Everything else is not an adherence event.
fn escalation_kind(kind: &str) -> Option<EscalationKind> {
    if REMINDER_KINDS.contains(&kind) {
        Some(EscalationKind::Reminder)
    } else if kind.contains("escalation") {
        Some(EscalationKind::Escalation)
    } else {
        None
    }
}

fn build_clinician_review(latest_review: Option<LatestReview>) -> ClinicianReview {
    match latest_review {
        Some(review) => ClinicianReview {
            reviewed: true,
            reviewed_at: Some(format_instant(review.reviewed_at)),
            reviewed_by: person_ref(review.reviewed_by.as_ref()),
            notes: None,
        },
        None => ClinicianReview {
            reviewed: false,
            reviewed_at: None,
            reviewed_by: PersonRef::empty(),
            notes: None,
        },
    }
}

/// Extracts the assignment id from a notification dedupe key
///
/// Keys look like `assignment:{id}:{suffix}`; the id only counts when a
/// closing `:` follows it.
fn parse_assignment_ref(dedupe_key: Option<&str>) -> Option<String> {
    let mut rest = dedupe_key?;
    while let Some(at) = rest.find("assignment:") {
        rest = &rest[at + "assignment:".len()..];
        match rest.find(':') {
            Some(0) => continue,
            Some(end) => return Some(rest[..end].to_string()),
            None => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::source::snapshot::SnapshotData;
    use crate::adapters::source::rows::{ClientRow, ClinicRow};
    use crate::adapters::source::SnapshotSource;

    fn ts(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn clinic(id: &str) -> ClinicRow {
        ClinicRow {
            id: id.to_string(),
            name: Some("Lakeside Clinic".to_string()),
        }
    }

    fn client(id: &str, user_id: &str, clinic_id: &str) -> ClientRow {
        ClientRow {
            id: id.to_string(),
            user_id: user_id.to_string(),
            clinic_id: clinic_id.to_string(),
        }
    }

    fn assignment(id: &str, created: &str, due: Option<&str>) -> AssignmentRow {
        AssignmentRow {
            id: id.to_string(),
            client_id: "client-1".to_string(),
            clinic_id: "clinic-1".to_string(),
            title: Some(format!("Worksheet {id}")),
            created_at: ts(created),
            published_at: None,
            due_date: due.map(ts),
            library_item_id: None,
            library_item_version_id: None,
            library_item_version: None,
            library_source_title: None,
            library_source_slug: None,
            library_source_content_type: None,
            library_assigned_title: None,
            library_assigned_slug: None,
            library_assigned_version_number: None,
            therapist: Some(PersonRow {
                user_id: "user-t1".to_string(),
                full_name: "Dana Reyes".to_string(),
            }),
            prompt_title: None,
        }
    }

    fn submission(id: &str, assignment_id: &str, created: &str) -> SubmissionRow {
        SubmissionRow {
            id: id.to_string(),
            assignment_id: assignment_id.to_string(),
            client_id: "client-1".to_string(),
            created_at: ts(created),
            mood: 4,
            reviewed_at: None,
            reviewed_by: None,
            flagged_at: None,
            starred_at: None,
        }
    }

    fn notification(id: &str, kind: &str, dedupe_key: Option<&str>, created: &str) -> NotificationRow {
        NotificationRow {
            id: id.to_string(),
            user_id: "user-c1".to_string(),
            kind: kind.to_string(),
            dedupe_key: dedupe_key.map(str::to_string),
            channel: None,
            created_at: ts(created),
        }
    }

    fn aggregator(data: SnapshotData) -> EvidenceAggregator {
        EvidenceAggregator::new(Arc::new(SnapshotSource::from_data(data)))
    }

    fn base_data() -> SnapshotData {
        SnapshotData {
            clinics: Some(vec![clinic("clinic-1")]),
            clients: Some(vec![client("client-1", "user-c1", "clinic-1")]),
            assignments: Some(Vec::new()),
            submissions: Some(Vec::new()),
            feedback: Some(Vec::new()),
            checkins: Some(Vec::new()),
            notifications: Some(Vec::new()),
        }
    }

    fn request() -> ReportRequest {
        let period = ReportPeriod::from_labels("2026-01-01", "2026-01-31").unwrap();
        let end = period.end();
        ReportRequest {
            clinic_id: "clinic-1".parse().unwrap(),
            client_id: "client-1".parse().unwrap(),
            period,
            program: None,
            generated_at_override: Some(end),
        }
    }

    #[tokio::test]
    async fn test_simple_completion() {
        let mut data = base_data();
        data.assignments = Some(vec![assignment(
            "a1",
            "2026-01-02T08:00:00.000Z",
            Some("2026-01-10T00:00:00.000Z"),
        )]);
        data.submissions = Some(vec![submission("r1", "a1", "2026-01-09T09:00:00.000Z")]);

        let report = aggregator(data).generate(&request()).await.unwrap();
        let entry = &report.prescribed_interventions[0];
        assert_eq!(
            entry.status_summary,
            StatusSummary {
                completed: 1,
                partial: 0,
                missed: 0,
                late: 0
            }
        );
        assert_eq!(entry.completed_at.as_deref(), Some("2026-01-09T09:00:00.000Z"));
        assert_eq!(entry.evidence_refs, vec!["r1"]);
    }

    #[tokio::test]
    async fn test_late_completion_after_due_date() {
        let mut data = base_data();
        data.assignments = Some(vec![assignment(
            "a1",
            "2026-01-02T08:00:00.000Z",
            Some("2026-01-05T00:00:00.000Z"),
        )]);
        data.submissions = Some(vec![submission("r1", "a1", "2026-01-20T09:00:00.000Z")]);

        let report = aggregator(data).generate(&request()).await.unwrap();
        let summary = &report.prescribed_interventions[0].status_summary;
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.late, 1);
        assert_eq!(summary.missed, 0);
    }

    #[tokio::test]
    async fn test_missed_assignment() {
        let mut data = base_data();
        data.assignments = Some(vec![assignment(
            "a1",
            "2026-01-01T08:00:00.000Z",
            Some("2026-01-02T00:00:00.000Z"),
        )]);

        let report = aggregator(data).generate(&request()).await.unwrap();
        let summary = &report.prescribed_interventions[0].status_summary;
        assert_eq!(summary.missed, 1);
        assert_eq!(summary.completed, 0);

        // A synthetic missed event lands on the timeline at the due date.
        let missed: Vec<&TimelineEvent> = report
            .adherence_timeline
            .iter()
            .filter(|e| e.kind == TimelineEventKind::AssignmentMissed)
            .collect();
        assert_eq!(missed.len(), 1);
        assert_eq!(missed[0].ts, "2026-01-02T00:00:00.000Z");
        assert_eq!(missed[0].reference.assignment_id.as_deref(), Some("a1"));
        assert_eq!(
            missed[0].details,
            TimelineDetails::Missed {
                reason: "no_response_by_due_date".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_pending_future_due_date_is_not_missed() {
        let mut data = base_data();
        data.assignments = Some(vec![assignment(
            "a1",
            "2026-01-20T08:00:00.000Z",
            Some("2026-02-15T00:00:00.000Z"),
        )]);

        let report = aggregator(data).generate(&request()).await.unwrap();
        let summary = &report.prescribed_interventions[0].status_summary;
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.missed, 0);
        assert!(report
            .adherence_timeline
            .iter()
            .all(|e| e.kind != TimelineEventKind::AssignmentMissed));
    }

    #[tokio::test]
    async fn test_empty_report_has_empty_lists() {
        let report = aggregator(base_data()).generate(&request()).await.unwrap();
        assert!(report.prescribed_interventions.is_empty());
        assert!(report.adherence_timeline.is_empty());
        assert!(report.noncompliance_escalations.is_empty());
        assert!(!report.clinician_review.reviewed);
        assert_eq!(report.context.clinic.name.as_deref(), Some("Lakeside Clinic"));
    }

    #[tokio::test]
    async fn test_timeline_tie_broken_by_event_type() {
        let mut data = base_data();
        data.assignments = Some(vec![assignment("a1", "2026-01-02T08:00:00.000Z", None)]);
        data.submissions = Some(vec![submission("r1", "a1", "2026-01-09T09:00:00.000Z")]);
        data.checkins = Some(vec![CheckinRow {
            id: "c1".to_string(),
            client_id: "client-1".to_string(),
            created_at: ts("2026-01-09T09:00:00.000Z"),
            mood: 2,
        }]);

        let report = aggregator(data).generate(&request()).await.unwrap();
        let kinds: Vec<TimelineEventKind> =
            report.adherence_timeline.iter().map(|e| e.kind).collect();
        // Same instant: "assignment_completed" orders before "checkin".
        assert_eq!(
            kinds,
            vec![TimelineEventKind::AssignmentCompleted, TimelineEventKind::Checkin]
        );
    }

    #[tokio::test]
    async fn test_evidence_refs_ordered_by_created_at_then_id() {
        let mut data = base_data();
        data.assignments = Some(vec![assignment("a1", "2026-01-02T08:00:00.000Z", None)]);
        data.submissions = Some(vec![
            submission("r9", "a1", "2026-01-09T09:00:00.000Z"),
            submission("r2", "a1", "2026-01-09T09:00:00.000Z"),
            submission("r5", "a1", "2026-01-08T09:00:00.000Z"),
        ]);

        let report = aggregator(data).generate(&request()).await.unwrap();
        assert_eq!(
            report.prescribed_interventions[0].evidence_refs,
            vec!["r5", "r2", "r9"]
        );
        // The completing submission is the first in that order.
        assert_eq!(
            report.prescribed_interventions[0].completed_at.as_deref(),
            Some("2026-01-08T09:00:00.000Z")
        );
    }

    #[tokio::test]
    async fn test_latest_review_wins_per_assignment() {
        let mut data = base_data();
        data.assignments = Some(vec![assignment("a1", "2026-01-02T08:00:00.000Z", None)]);
        let mut early = submission("r1", "a1", "2026-01-05T09:00:00.000Z");
        early.reviewed_at = Some(ts("2026-01-06T10:00:00.000Z"));
        early.reviewed_by = Some(PersonRow {
            user_id: "user-t1".to_string(),
            full_name: "Dana Reyes".to_string(),
        });
        let mut later = submission("r2", "a1", "2026-01-07T09:00:00.000Z");
        later.reviewed_at = Some(ts("2026-01-08T10:00:00.000Z"));
        later.reviewed_by = Some(PersonRow {
            user_id: "user-t2".to_string(),
            full_name: "Noel Price".to_string(),
        });
        data.submissions = Some(vec![early, later]);

        let report = aggregator(data).generate(&request()).await.unwrap();
        let entry = &report.prescribed_interventions[0];
        assert_eq!(entry.reviewed_at.as_deref(), Some("2026-01-08T10:00:00.000Z"));
        assert_eq!(entry.reviewed_by.name.as_deref(), Some("Noel Price"));
    }

    #[tokio::test]
    async fn test_notifications_feed_timeline_and_escalations() {
        let mut data = base_data();
        data.notifications = Some(vec![
            notification(
                "n1",
                "assignment_due_24h",
                Some("assignment:a1:due_24h"),
                "2026-01-04T08:00:00.000Z",
            ),
            notification(
                "n2",
                "assignment_manual_reminder",
                Some("assignment:a1:manual:2026-01-06"),
                "2026-01-06T08:00:00.000Z",
            ),
            notification("n3", "weekly_digest", None, "2026-01-07T08:00:00.000Z"),
        ]);

        let report = aggregator(data).generate(&request()).await.unwrap();

        // Every notification appears on the timeline.
        let sent: Vec<&TimelineEvent> = report
            .adherence_timeline
            .iter()
            .filter(|e| e.kind == TimelineEventKind::NotificationSent)
            .collect();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].reference.assignment_id.as_deref(), Some("a1"));
        assert_eq!(sent[2].reference.assignment_id, None);

        // Only reminder/escalation kinds become escalations; digests don't.
        assert_eq!(report.noncompliance_escalations.len(), 2);
        let first = &report.noncompliance_escalations[0];
        assert_eq!(first.kind, EscalationKind::Reminder);
        assert_eq!(first.channel, EscalationChannel::Unknown);
        assert_eq!(first.details.notification_type, "assignment_due_24h");
        assert_eq!(first.details.assignment_id.as_deref(), Some("a1"));
    }

    #[tokio::test]
    async fn test_escalation_tagged_notifications_kept() {
        let mut data = base_data();
        data.notifications = Some(vec![notification(
            "n1",
            "noncompliance_escalation",
            Some("assignment:a1:escalation"),
            "2026-01-12T08:00:00.000Z",
        )]);

        let report = aggregator(data).generate(&request()).await.unwrap();
        assert_eq!(report.noncompliance_escalations.len(), 1);
        let event = &report.noncompliance_escalations[0];
        assert_eq!(event.kind, EscalationKind::Escalation);
        assert_eq!(event.details.notification_type, "noncompliance_escalation");
        assert_eq!(event.details.assignment_id.as_deref(), Some("a1"));

        let json = serde_json::to_string(event).unwrap();
        assert!(json.contains("\"type\":\"escalation\""));
    }

    #[tokio::test]
    async fn test_escalation_channel_comes_from_source() {
        let mut data = base_data();
        let mut reminder = notification(
            "n1",
            "assignment_due_24h",
            Some("assignment:a1:due_24h"),
            "2026-01-04T08:00:00.000Z",
        );
        reminder.channel = Some("email".to_string());
        data.notifications = Some(vec![reminder]);

        let report = aggregator(data).generate(&request()).await.unwrap();
        assert_eq!(
            report.noncompliance_escalations[0].channel,
            EscalationChannel::Email
        );
        // The source recorded a channel, so the gap is not declared.
        assert!(!report
            .not_available
            .iter()
            .any(|entry| entry.contains("noncompliance_escalations.channel")));
    }

    #[tokio::test]
    async fn test_channel_on_non_adherence_notification_does_not_count() {
        let mut data = base_data();
        let mut digest = notification("n1", "weekly_digest", None, "2026-01-07T08:00:00.000Z");
        digest.channel = Some("email".to_string());
        data.notifications = Some(vec![
            digest,
            notification(
                "n2",
                "assignment_due_24h",
                Some("assignment:a1:due_24h"),
                "2026-01-04T08:00:00.000Z",
            ),
        ]);

        let report = aggregator(data).generate(&request()).await.unwrap();
        assert_eq!(
            report.noncompliance_escalations[0].channel,
            EscalationChannel::Unknown
        );
        assert!(report
            .not_available
            .iter()
            .any(|entry| entry.contains("noncompliance_escalations.channel")));
    }

    #[tokio::test]
    async fn test_escalations_ordered_by_ts_type_channel() {
        let mut data = base_data();
        let mut sms_reminder = notification(
            "n1",
            "assignment_due_24h",
            Some("assignment:a1:due_24h"),
            "2026-01-04T08:00:00.000Z",
        );
        sms_reminder.channel = Some("sms".to_string());
        let mut email_reminder = notification(
            "n2",
            "assignment_due_24h",
            Some("assignment:a2:due_24h"),
            "2026-01-04T08:00:00.000Z",
        );
        email_reminder.channel = Some("email".to_string());
        let escalation = notification(
            "n3",
            "noncompliance_escalation",
            Some("assignment:a1:escalation"),
            "2026-01-04T08:00:00.000Z",
        );
        data.notifications = Some(vec![sms_reminder, escalation, email_reminder]);

        let report = aggregator(data).generate(&request()).await.unwrap();
        let keys: Vec<(&str, &str)> = report
            .noncompliance_escalations
            .iter()
            .map(|e| (e.kind.as_str(), e.channel.as_str()))
            .collect();
        // Equal timestamps: type breaks the tie, then channel.
        assert_eq!(
            keys,
            vec![
                ("escalation", "unknown"),
                ("reminder", "email"),
                ("reminder", "sms"),
            ]
        );
    }

    #[tokio::test]
    async fn test_not_available_list_is_stable() {
        let report = aggregator(base_data()).generate(&request()).await.unwrap();
        assert_eq!(
            report.not_available,
            vec![
                "context.client.display_id (no display_id in clients table)",
                "prescribed_interventions.completion_criteria (no field in assignments/prompts)",
                "prescribed_interventions.status_summary.partial (no partial completion model)",
                "clinician_review.notes (no review notes model)",
                "noncompliance_escalations.channel (delivery channel not stored)",
                "audit_integrity.hash (not implemented in v1)",
            ]
        );
    }

    #[tokio::test]
    async fn test_program_filter_declared_not_available() {
        let mut req = request();
        req.program = Some("cbt-basics".to_string());
        let report = aggregator(base_data()).generate(&req).await.unwrap();
        assert_eq!(
            report.not_available[0],
            "program filter (no program field to filter assignments/clients)"
        );
        assert_eq!(
            report.audit_integrity.report_id,
            "AER-v1:clinic-1:client-1:2026-01-01:2026-01-31:cbt-basics"
        );
        assert_eq!(report.meta.program.as_deref(), Some("cbt-basics"));
    }

    #[tokio::test]
    async fn test_unknown_clinic_is_not_found() {
        let mut req = request();
        req.clinic_id = "clinic-9".parse().unwrap();
        let err = aggregator(base_data()).generate(&req).await.unwrap_err();
        assert!(matches!(err, AerError::NotFound(ref msg) if msg == "Clinic not found"));
    }

    #[tokio::test]
    async fn test_unknown_client_is_not_found() {
        let mut req = request();
        req.client_id = "client-9".parse().unwrap();
        let err = aggregator(base_data()).generate(&req).await.unwrap_err();
        assert!(matches!(err, AerError::NotFound(ref msg) if msg == "Client not found"));
    }

    #[tokio::test]
    async fn test_foreign_client_is_forbidden() {
        let mut data = base_data();
        data.clinics = Some(vec![clinic("clinic-1"), clinic("clinic-2")]);
        data.clients = Some(vec![client("client-1", "user-c1", "clinic-2")]);
        let err = aggregator(data).generate(&request()).await.unwrap_err();
        assert!(matches!(err, AerError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_generated_at_pinned_by_override() {
        let report = aggregator(base_data()).generate(&request()).await.unwrap();
        assert_eq!(report.meta.generated_at, "2026-01-31T23:59:59.999Z");
    }

    #[tokio::test]
    async fn test_repeated_generation_is_byte_identical() {
        let report_a = aggregator(base_data()).generate(&request()).await.unwrap();
        let report_b = aggregator(base_data()).generate(&request()).await.unwrap();
        assert_eq!(
            report_a.to_json_bytes().unwrap(),
            report_b.to_json_bytes().unwrap()
        );
    }

    #[tokio::test]
    async fn test_audit_integrity_names_the_source() {
        let report = aggregator(base_data()).generate(&request()).await.unwrap();
        assert_eq!(report.audit_integrity.data_sources, vec!["snapshot"]);
        assert_eq!(report.audit_integrity.hash, None);
        assert_eq!(
            report.audit_integrity.report_id,
            "AER-v1:clinic-1:client-1:2026-01-01:2026-01-31"
        );
    }

    #[test]
    fn test_parse_assignment_ref() {
        assert_eq!(
            parse_assignment_ref(Some("assignment:a1:due_24h")),
            Some("a1".to_string())
        );
        assert_eq!(
            parse_assignment_ref(Some("reminder:assignment:abc-123:manual")),
            Some("abc-123".to_string())
        );
        // No closing colon after the id.
        assert_eq!(parse_assignment_ref(Some("assignment:a1")), None);
        // Empty id segment does not match.
        assert_eq!(parse_assignment_ref(Some("assignment::x")), None);
        assert_eq!(parse_assignment_ref(Some("other:key")), None);
        assert_eq!(parse_assignment_ref(None), None);
    }

    #[test]
    fn test_published_at_wins_over_created_at() {
        let mut row = assignment("a1", "2026-01-02T08:00:00.000Z", None);
        row.published_at = Some(ts("2026-01-03T08:00:00.000Z"));
        let interventions = build_interventions(&[row], &HashMap::new(), ts("2026-01-31T23:59:59.999Z"));
        assert_eq!(
            interventions[0].assigned_at.as_deref(),
            Some("2026-01-03T08:00:00.000Z")
        );
        assert_eq!(
            interventions[0].due.start.as_deref(),
            Some("2026-01-03T08:00:00.000Z")
        );
    }

    #[test]
    fn test_library_source_prefers_assigned_fields() {
        let mut row = assignment("a1", "2026-01-02T08:00:00.000Z", None);
        row.library_item_id = Some("item-1".to_string());
        row.library_item_version = Some(2);
        row.library_source_title = Some("Live Title".to_string());
        row.library_assigned_title = Some("Assigned Title".to_string());
        row.library_assigned_version_number = Some(1);

        let source = library_source(&row).unwrap();
        assert_eq!(source.title.as_deref(), Some("Assigned Title"));
        assert_eq!(source.version, Some(1));
        assert_eq!(source.status, "PUBLISHED");
    }
}
