//! Typed rows returned by event-source adapters
//!
//! These are the raw shapes the system of record exports, denormalized so a
//! single row carries everything the aggregator needs (clinic ownership,
//! therapist refs, library provenance). Timestamps are instants; formatting
//! for the wire happens in the report builder, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A clinic row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicRow {
    pub id: String,
    pub name: Option<String>,
}

/// A client row, denormalized with the owning clinic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRow {
    pub id: String,
    /// The client's login user id; notifications are keyed by this
    pub user_id: String,
    /// Clinic the client's therapist belongs to
    pub clinic_id: String,
}

/// A user reference as exported (therapist, reviewer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRow {
    pub user_id: String,
    pub full_name: String,
}

/// An assignment row with library provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub id: String,
    pub client_id: String,
    pub clinic_id: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub library_item_id: Option<String>,
    pub library_item_version_id: Option<String>,
    pub library_item_version: Option<i64>,
    pub library_source_title: Option<String>,
    pub library_source_slug: Option<String>,
    pub library_source_content_type: Option<String>,
    /// Title/slug/version pinned at assignment time, preferred over the
    /// library item's current values
    pub library_assigned_title: Option<String>,
    pub library_assigned_slug: Option<String>,
    pub library_assigned_version_number: Option<i64>,
    pub therapist: Option<PersonRow>,
    pub prompt_title: Option<String>,
}

/// A submission (task response) row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRow {
    pub id: String,
    pub assignment_id: String,
    pub client_id: String,
    pub created_at: DateTime<Utc>,
    pub mood: i64,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<PersonRow>,
    pub flagged_at: Option<DateTime<Utc>>,
    pub starred_at: Option<DateTime<Utc>>,
}

/// A clinician feedback row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRow {
    pub id: String,
    pub response_id: String,
    pub assignment_id: String,
    pub client_id: String,
    pub created_at: DateTime<Utc>,
    pub therapist: Option<PersonRow>,
}

/// A mood check-in row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinRow {
    pub id: String,
    pub client_id: String,
    pub created_at: DateTime<Utc>,
    pub mood: i64,
}

/// A notification row, keyed by the recipient's user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRow {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Dedupe keys of the form `assignment:{id}:...` carry the assignment
    /// reference
    pub dedupe_key: Option<String>,
    /// Delivery channel when the source records one
    pub channel: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The most recent clinician review inside a period
#[derive(Debug, Clone, PartialEq)]
pub struct LatestReview {
    pub reviewed_at: DateTime<Utc>,
    pub reviewed_by: Option<PersonRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_row_deserializes_iso_timestamps() {
        let json = r#"{
            "id": "a1",
            "client_id": "client-1",
            "clinic_id": "clinic-1",
            "title": "Assignment 1",
            "created_at": "2026-01-02T10:00:00.000Z",
            "published_at": "2026-01-02T10:00:00.000Z",
            "due_date": "2026-01-10T00:00:00.000Z",
            "library_item_id": "lib-1",
            "library_item_version_id": "ver-1",
            "library_item_version": 3,
            "library_source_title": "Library Item",
            "library_source_slug": "library-item",
            "library_source_content_type": "Therapeutic",
            "library_assigned_title": null,
            "library_assigned_slug": null,
            "library_assigned_version_number": null,
            "therapist": { "user_id": "therapist-1", "full_name": "Therapist One" },
            "prompt_title": "Prompt 1"
        }"#;
        let row: AssignmentRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.id, "a1");
        assert_eq!(row.library_item_version, Some(3));
        assert_eq!(row.therapist.as_ref().unwrap().user_id, "therapist-1");
        assert!(row.published_at.is_some());
    }

    #[test]
    fn test_notification_row_type_key() {
        let json = r#"{
            "id": "n1",
            "user_id": "user-1",
            "type": "assignment_due_24h",
            "dedupe_key": "assignment:a1:reminder:24h",
            "channel": null,
            "created_at": "2026-01-09T12:00:00.000Z"
        }"#;
        let row: NotificationRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.kind, "assignment_due_24h");
        assert!(row.channel.is_none());
    }
}
