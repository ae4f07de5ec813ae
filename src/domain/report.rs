//! Adherence Evidence Report domain model
//!
//! This module defines the canonical `AerReport` value and its wire shape.
//! Field names and ordering are a compatibility contract: downstream
//! consumers parse the serialized JSON, and the verification manifest hashes
//! it, so the serialized form must stay byte-stable for a given report.
//!
//! Timestamps are carried as pre-formatted RFC 3339 strings with millisecond
//! precision (`2026-01-09T09:00:00.000Z`). The fixed width makes
//! lexicographic comparison agree with chronological order, which the
//! sorting rules below rely on.

use serde::{Deserialize, Serialize};

/// Report type tag carried in `meta.report_type`
pub const REPORT_TYPE: &str = "AER";

/// Report format version carried in `meta.version`
pub const REPORT_VERSION: &str = "v1";

/// The canonical report value, immutable once built
///
/// Struct field order matches the serialized key order exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AerReport {
    /// Report identity and generation provenance
    pub meta: ReportMeta,

    /// Clinic/client display context
    pub context: ReportContext,

    /// One entry per assignment touched in the period
    pub prescribed_interventions: Vec<PrescribedIntervention>,

    /// All adherence events in the period, globally ordered
    pub adherence_timeline: Vec<TimelineEvent>,

    /// Reminder/escalation events, independently ordered
    pub noncompliance_escalations: Vec<EscalationEvent>,

    /// Most recent clinician review inside the period
    pub clinician_review: ClinicianReview,

    /// Provenance tags and the content-addressable report id
    pub audit_integrity: AuditIntegrity,

    /// Fields the aggregator could not populate, declared explicitly
    pub not_available: Vec<String>,
}

impl AerReport {
    /// Serializes the report to its canonical compact JSON bytes
    ///
    /// This is the exact byte sequence that gets hashed into the
    /// verification manifest and stored as `AER.json`.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Report metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub report_type: String,
    pub version: String,
    pub generated_at: String,
    pub period: PeriodLabels,
    pub clinic_id: String,
    pub client_id: String,
    pub program: Option<String>,
    pub generated_by: GeneratedBy,
    pub verification: VerificationMeta,
}

/// Calendar-date labels bounding the reporting period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodLabels {
    pub start: String,
    pub end: String,
}

/// Who (or what) produced the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedBy {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// Verification provenance: which standard, schema, and generator build
/// produced this report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationMeta {
    pub standard: String,
    pub standard_version: String,
    pub schema_version: String,
    pub schema_sha256: String,
    pub generator_commit: String,
    pub verification_tool_version: String,
}

/// Clinic/client display context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportContext {
    pub clinic: ClinicContext,
    pub client: ClientContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicContext {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientContext {
    pub display_id: Option<String>,
}

/// A prescribed intervention (assignment) with its completion evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribedIntervention {
    pub assignment_id: String,
    pub title: Option<String>,
    pub library_source: Option<LibrarySource>,
    pub assigned_by: PersonRef,
    pub assigned_at: Option<String>,
    pub due: DueWindow,
    pub completion_criteria: Option<String>,
    /// First qualifying submission in the period
    pub completed_at: Option<String>,
    /// Latest clinician review of any submission in the period
    pub reviewed_at: Option<String>,
    pub reviewed_by: PersonRef,
    /// Submission ids cited as completion evidence, in submission order
    pub evidence_refs: Vec<String>,
    pub status_summary: StatusSummary,
}

/// Content-library provenance for an assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarySource {
    pub item_id: String,
    pub version_id: Option<String>,
    pub version: Option<i64>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content_type: Option<String>,
    pub status: String,
}

/// A user reference (therapist, reviewer) with both id and display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRef {
    pub user_id: Option<String>,
    pub name: Option<String>,
}

impl PersonRef {
    /// A reference with neither id nor name
    pub fn empty() -> Self {
        Self {
            user_id: None,
            name: None,
        }
    }
}

/// Assignment availability window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueWindow {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Per-assignment completion counters
///
/// Counters, not booleans, so multi-occurrence tasks can be added without a
/// wire change. Under single-submission semantics `completed + missed <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub completed: u32,
    pub partial: u32,
    pub missed: u32,
    pub late: u32,
}

/// One event on the adherence timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub ts: String,
    #[serde(rename = "type")]
    pub kind: TimelineEventKind,
    pub source: EventOrigin,
    #[serde(rename = "ref")]
    pub reference: EventRef,
    pub details: TimelineDetails,
}

impl TimelineEvent {
    /// The reference id used for ordering: assignment id, else response id
    pub fn sort_ref_id(&self) -> &str {
        self.reference
            .assignment_id
            .as_deref()
            .or(self.reference.response_id.as_deref())
            .unwrap_or("")
    }

    /// Total ordering key: (ts, type, reference id, response id)
    ///
    /// Every list of timeline events in every artifact is ordered by this
    /// key and nothing else.
    pub fn sort_key(&self) -> (&str, &str, &str, &str) {
        (
            &self.ts,
            self.kind.as_str(),
            self.sort_ref_id(),
            self.reference.response_id.as_deref().unwrap_or(""),
        )
    }
}

/// Timeline event discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    AssignmentCompleted,
    AssignmentPartial,
    AssignmentMissed,
    Checkin,
    Feedback,
    NotificationSent,
    Other,
}

impl TimelineEventKind {
    /// Wire name of the event kind; also the ordering key for type
    /// tie-breaks
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineEventKind::AssignmentCompleted => "assignment_completed",
            TimelineEventKind::AssignmentPartial => "assignment_partial",
            TimelineEventKind::AssignmentMissed => "assignment_missed",
            TimelineEventKind::Checkin => "checkin",
            TimelineEventKind::Feedback => "feedback",
            TimelineEventKind::NotificationSent => "notification_sent",
            TimelineEventKind::Other => "other",
        }
    }
}

/// Which actor class produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrigin {
    Client,
    System,
    Clinician,
}

impl EventOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOrigin::Client => "client",
            EventOrigin::System => "system",
            EventOrigin::Clinician => "clinician",
        }
    }
}

/// Optional assignment/submission pair an event refers to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRef {
    pub assignment_id: Option<String>,
    pub response_id: Option<String>,
}

impl EventRef {
    pub fn none() -> Self {
        Self {
            assignment_id: None,
            response_id: None,
        }
    }

    pub fn assignment(assignment_id: impl Into<String>) -> Self {
        Self {
            assignment_id: Some(assignment_id.into()),
            response_id: None,
        }
    }
}

/// Typed per-event payload
///
/// One variant per event kind, so adding a kind forces the payload question
/// at compile time. Serialized untagged: only the payload fields appear on
/// the wire. `Feedback` must stay last: untagged deserialization takes the
/// first matching variant, and a variant with only optional fields would
/// otherwise swallow every other payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimelineDetails {
    /// `assignment_completed`
    Submission {
        mood: i64,
        reviewed_at: Option<String>,
        flagged_at: Option<String>,
        starred_at: Option<String>,
        late: bool,
    },
    /// `checkin`
    Checkin { checkin_id: String, mood: i64 },
    /// `notification_sent`
    Notification { notification_type: String },
    /// `assignment_missed`
    Missed { reason: String },
    /// `feedback`
    Feedback {
        therapist_user_id: Option<String>,
        therapist_name: Option<String>,
    },
}

/// One reminder/escalation event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationEvent {
    pub ts: String,
    #[serde(rename = "type")]
    pub kind: EscalationKind,
    pub channel: EscalationChannel,
    pub details: EscalationDetails,
}

impl EscalationEvent {
    /// Total ordering key: (ts, type, channel)
    pub fn sort_key(&self) -> (&str, &str, &str) {
        (&self.ts, self.kind.as_str(), self.channel.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationKind {
    Reminder,
    Escalation,
}

impl EscalationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationKind::Reminder => "reminder",
            EscalationKind::Escalation => "escalation",
        }
    }
}

/// Delivery channel of a reminder/escalation
///
/// `Unknown` is a legitimate value when the source does not record the
/// channel, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationChannel {
    Email,
    Sms,
    Inapp,
    Unknown,
}

impl EscalationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationChannel::Email => "email",
            EscalationChannel::Sms => "sms",
            EscalationChannel::Inapp => "inapp",
            EscalationChannel::Unknown => "unknown",
        }
    }

    /// Maps an optional source-row channel string, defaulting to `Unknown`
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("email") => EscalationChannel::Email,
            Some("sms") => EscalationChannel::Sms,
            Some("inapp") => EscalationChannel::Inapp,
            _ => EscalationChannel::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationDetails {
    pub notification_type: String,
    pub assignment_id: Option<String>,
}

/// Most recent clinician review inside the period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicianReview {
    pub reviewed: bool,
    pub reviewed_at: Option<String>,
    pub reviewed_by: PersonRef,
    pub notes: Option<String>,
}

/// Provenance tags, audit notes and the report id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditIntegrity {
    pub data_sources: Vec<String>,
    pub notes: String,
    pub report_id: String,
    /// Reserved for a future signed-report scheme
    pub hash: Option<String>,
}
