//! JSON snapshot event source
//!
//! This adapter reads the whole system-of-record export from a single JSON
//! document and answers every [`EventSource`] query in memory. Snapshots are
//! what make report runs reproducible: the same file always yields the same
//! rows, so the same request always yields the same bytes.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::adapters::source::rows::{
    AssignmentRow, CheckinRow, ClientRow, ClinicRow, FeedbackRow, LatestReview, NotificationRow,
    SubmissionRow,
};
use crate::adapters::source::traits::EventSource;
use crate::domain::errors::SourceError;
use crate::domain::ids::{ClientId, ClinicId};
use crate::domain::period::ReportPeriod;
use crate::domain::Result;

/// Raw snapshot document
///
/// Every collection is optional at the serde level so an absent one can be
/// reported by name instead of surfacing as a generic parse failure. An
/// empty collection is valid; a missing one is not.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotData {
    pub clinics: Option<Vec<ClinicRow>>,
    pub clients: Option<Vec<ClientRow>>,
    pub assignments: Option<Vec<AssignmentRow>>,
    pub submissions: Option<Vec<SubmissionRow>>,
    pub feedback: Option<Vec<FeedbackRow>>,
    pub checkins: Option<Vec<CheckinRow>>,
    pub notifications: Option<Vec<NotificationRow>>,
}

/// Event source backed by a JSON snapshot file
#[derive(Debug)]
pub struct SnapshotSource {
    data: SnapshotData,
}

impl SnapshotSource {
    /// Load a snapshot from disk
    ///
    /// # Errors
    ///
    /// Returns `SourceError::SnapshotRead` when the file cannot be read and
    /// `SourceError::SnapshotParse` when it is not valid snapshot JSON.
    pub async fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading event snapshot");

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SourceError::SnapshotRead(format!("{}: {e}", path.display())))?;

        let source = Self::from_json(&bytes)?;

        tracing::debug!(
            clinics = source.data.clinics.as_ref().map_or(0, Vec::len),
            clients = source.data.clients.as_ref().map_or(0, Vec::len),
            assignments = source.data.assignments.as_ref().map_or(0, Vec::len),
            "Event snapshot loaded"
        );

        Ok(source)
    }

    /// Parse a snapshot from raw JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let data: SnapshotData =
            serde_json::from_slice(bytes).map_err(|e| SourceError::SnapshotParse(e.to_string()))?;
        Ok(Self { data })
    }

    /// Build a source directly from parsed snapshot data
    pub fn from_data(data: SnapshotData) -> Self {
        Self { data }
    }

    fn clinics(&self) -> Result<&[ClinicRow]> {
        collection(&self.data.clinics, "clinics")
    }

    fn clients(&self) -> Result<&[ClientRow]> {
        collection(&self.data.clients, "clients")
    }

    fn assignments(&self) -> Result<&[AssignmentRow]> {
        collection(&self.data.assignments, "assignments")
    }

    fn submissions(&self) -> Result<&[SubmissionRow]> {
        collection(&self.data.submissions, "submissions")
    }

    fn feedback_rows(&self) -> Result<&[FeedbackRow]> {
        collection(&self.data.feedback, "feedback")
    }

    fn checkins(&self) -> Result<&[CheckinRow]> {
        collection(&self.data.checkins, "checkins")
    }

    fn notifications(&self) -> Result<&[NotificationRow]> {
        collection(&self.data.notifications, "notifications")
    }

    /// Ids of assignments owned by the clinic, for ownership joins
    fn clinic_assignment_ids(&self, clinic_id: &ClinicId) -> Result<HashSet<&str>> {
        Ok(self
            .assignments()?
            .iter()
            .filter(|a| a.clinic_id == clinic_id.as_str())
            .map(|a| a.id.as_str())
            .collect())
    }
}

fn collection<'a, T>(field: &'a Option<Vec<T>>, name: &str) -> Result<&'a [T]> {
    match field {
        Some(rows) => Ok(rows.as_slice()),
        None => Err(SourceError::MissingCollection(name.to_string()).into()),
    }
}

/// Whether an assignment was touched inside the period
///
/// Touched means created, published, or due inside the period, or having at
/// least one submission inside the period.
fn assignment_touched(
    row: &AssignmentRow,
    period: &ReportPeriod,
    submissions: &[SubmissionRow],
) -> bool {
    period.contains(row.created_at)
        || row.published_at.map_or(false, |ts| period.contains(ts))
        || row.due_date.map_or(false, |ts| period.contains(ts))
        || submissions
            .iter()
            .any(|s| s.assignment_id == row.id && period.contains(s.created_at))
}

fn sorted_by_id<T, F>(mut rows: Vec<T>, id_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    rows.sort_by(|a, b| id_of(a).cmp(id_of(b)));
    rows
}

#[async_trait]
impl EventSource for SnapshotSource {
    fn source_tag(&self) -> &str {
        "snapshot"
    }

    async fn test_connection(&self) -> Result<()> {
        self.clinics()?;
        self.clients()?;
        self.assignments()?;
        self.submissions()?;
        self.feedback_rows()?;
        self.checkins()?;
        self.notifications()?;
        Ok(())
    }

    async fn fetch_clinic(&self, clinic_id: &ClinicId) -> Result<Option<ClinicRow>> {
        Ok(self
            .clinics()?
            .iter()
            .find(|c| c.id == clinic_id.as_str())
            .cloned())
    }

    async fn fetch_client(&self, client_id: &ClientId) -> Result<Option<ClientRow>> {
        Ok(self
            .clients()?
            .iter()
            .find(|c| c.id == client_id.as_str())
            .cloned())
    }

    async fn fetch_clients(&self, clinic_id: &ClinicId) -> Result<Vec<ClientRow>> {
        let rows: Vec<ClientRow> = self
            .clients()?
            .iter()
            .filter(|c| c.clinic_id == clinic_id.as_str())
            .cloned()
            .collect();
        Ok(sorted_by_id(rows, |c| &c.id))
    }

    async fn fetch_assignments(
        &self,
        clinic_id: &ClinicId,
        client_id: &ClientId,
        period: &ReportPeriod,
    ) -> Result<Vec<AssignmentRow>> {
        let submissions = self.submissions()?;
        let rows: Vec<AssignmentRow> = self
            .assignments()?
            .iter()
            .filter(|a| a.client_id == client_id.as_str() && a.clinic_id == clinic_id.as_str())
            .filter(|a| assignment_touched(a, period, submissions))
            .cloned()
            .collect();
        Ok(sorted_by_id(rows, |a| &a.id))
    }

    async fn fetch_submissions(
        &self,
        clinic_id: &ClinicId,
        client_id: &ClientId,
        period: &ReportPeriod,
    ) -> Result<Vec<SubmissionRow>> {
        let owned = self.clinic_assignment_ids(clinic_id)?;
        let rows: Vec<SubmissionRow> = self
            .submissions()?
            .iter()
            .filter(|s| {
                s.client_id == client_id.as_str()
                    && period.contains(s.created_at)
                    && owned.contains(s.assignment_id.as_str())
            })
            .cloned()
            .collect();
        Ok(sorted_by_id(rows, |s| &s.id))
    }

    async fn fetch_feedback(
        &self,
        clinic_id: &ClinicId,
        client_id: &ClientId,
        period: &ReportPeriod,
    ) -> Result<Vec<FeedbackRow>> {
        let owned = self.clinic_assignment_ids(clinic_id)?;
        let rows: Vec<FeedbackRow> = self
            .feedback_rows()?
            .iter()
            .filter(|f| {
                f.client_id == client_id.as_str()
                    && period.contains(f.created_at)
                    && owned.contains(f.assignment_id.as_str())
            })
            .cloned()
            .collect();
        Ok(sorted_by_id(rows, |f| &f.id))
    }

    async fn fetch_checkins(
        &self,
        client_id: &ClientId,
        period: &ReportPeriod,
    ) -> Result<Vec<CheckinRow>> {
        let rows: Vec<CheckinRow> = self
            .checkins()?
            .iter()
            .filter(|c| c.client_id == client_id.as_str() && period.contains(c.created_at))
            .cloned()
            .collect();
        Ok(sorted_by_id(rows, |c| &c.id))
    }

    async fn fetch_notifications(
        &self,
        user_id: &str,
        period: &ReportPeriod,
    ) -> Result<Vec<NotificationRow>> {
        let rows: Vec<NotificationRow> = self
            .notifications()?
            .iter()
            .filter(|n| n.user_id == user_id && period.contains(n.created_at))
            .cloned()
            .collect();
        Ok(sorted_by_id(rows, |n| &n.id))
    }

    async fn fetch_latest_review(
        &self,
        clinic_id: &ClinicId,
        client_id: &ClientId,
        period: &ReportPeriod,
    ) -> Result<Option<LatestReview>> {
        let owned = self.clinic_assignment_ids(clinic_id)?;
        let best = self
            .submissions()?
            .iter()
            .filter(|s| {
                s.client_id == client_id.as_str() && owned.contains(s.assignment_id.as_str())
            })
            .filter_map(|s| s.reviewed_at.map(|ts| (ts, s)))
            .filter(|(ts, _)| period.contains(*ts))
            // Row id breaks timestamp ties so the pick is stable.
            .max_by(|(a_ts, a), (b_ts, b)| a_ts.cmp(b_ts).then_with(|| a.id.cmp(&b.id)));

        Ok(best.map(|(ts, s)| LatestReview {
            reviewed_at: ts,
            reviewed_by: s.reviewed_by.clone(),
        }))
    }

    async fn fetch_clinic_assignments(
        &self,
        clinic_id: &ClinicId,
        period: &ReportPeriod,
    ) -> Result<Vec<AssignmentRow>> {
        let submissions = self.submissions()?;
        let rows: Vec<AssignmentRow> = self
            .assignments()?
            .iter()
            .filter(|a| a.clinic_id == clinic_id.as_str())
            .filter(|a| assignment_touched(a, period, submissions))
            .cloned()
            .collect();
        Ok(sorted_by_id(rows, |a| &a.id))
    }

    async fn fetch_clinic_submissions(
        &self,
        clinic_id: &ClinicId,
        period: &ReportPeriod,
    ) -> Result<Vec<SubmissionRow>> {
        let owned = self.clinic_assignment_ids(clinic_id)?;
        let rows: Vec<SubmissionRow> = self
            .submissions()?
            .iter()
            .filter(|s| period.contains(s.created_at) && owned.contains(s.assignment_id.as_str()))
            .cloned()
            .collect();
        Ok(sorted_by_id(rows, |s| &s.id))
    }

    async fn fetch_clinic_checkins(
        &self,
        clinic_id: &ClinicId,
        period: &ReportPeriod,
    ) -> Result<Vec<CheckinRow>> {
        let members: HashSet<&str> = self
            .clients()?
            .iter()
            .filter(|c| c.clinic_id == clinic_id.as_str())
            .map(|c| c.id.as_str())
            .collect();
        let rows: Vec<CheckinRow> = self
            .checkins()?
            .iter()
            .filter(|c| members.contains(c.client_id.as_str()) && period.contains(c.created_at))
            .cloned()
            .collect();
        Ok(sorted_by_id(rows, |c| &c.id))
    }
}
