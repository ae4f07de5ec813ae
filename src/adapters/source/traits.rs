//! Event-source abstraction trait
//!
//! This module defines the narrow read interface the aggregator and rollup
//! consume. Adapters return typed rows scoped by clinic/client and an
//! inclusive instant range, ordered by primary key only — the consumers
//! apply their own total ordering and never trust source ordering.

use crate::adapters::source::rows::{
    AssignmentRow, CheckinRow, ClientRow, ClinicRow, FeedbackRow, LatestReview, NotificationRow,
    SubmissionRow,
};
use crate::domain::ids::{ClientId, ClinicId};
use crate::domain::period::ReportPeriod;
use crate::domain::Result;
use async_trait::async_trait;

/// Read interface over the system of record
///
/// All fetch methods are pure reads; adapters must not mutate anything.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Provenance tag recorded in `audit_integrity.data_sources`
    fn source_tag(&self) -> &str;

    /// Test that the source is reachable and well-formed
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed.
    async fn test_connection(&self) -> Result<()>;

    /// Fetch a clinic by id, `None` when absent
    async fn fetch_clinic(&self, clinic_id: &ClinicId) -> Result<Option<ClinicRow>>;

    /// Fetch a client by id, `None` when absent
    async fn fetch_client(&self, client_id: &ClientId) -> Result<Option<ClientRow>>;

    /// Fetch all clients belonging to a clinic
    async fn fetch_clients(&self, clinic_id: &ClinicId) -> Result<Vec<ClientRow>>;

    /// Fetch assignments touched in the period for one client
    ///
    /// "Touched" means created, published, or due inside the period, or
    /// having at least one submission inside the period.
    async fn fetch_assignments(
        &self,
        clinic_id: &ClinicId,
        client_id: &ClientId,
        period: &ReportPeriod,
    ) -> Result<Vec<AssignmentRow>>;

    /// Fetch one client's submissions created inside the period
    async fn fetch_submissions(
        &self,
        clinic_id: &ClinicId,
        client_id: &ClientId,
        period: &ReportPeriod,
    ) -> Result<Vec<SubmissionRow>>;

    /// Fetch clinician feedback created inside the period for one client
    async fn fetch_feedback(
        &self,
        clinic_id: &ClinicId,
        client_id: &ClientId,
        period: &ReportPeriod,
    ) -> Result<Vec<FeedbackRow>>;

    /// Fetch one client's check-ins inside the period
    async fn fetch_checkins(
        &self,
        client_id: &ClientId,
        period: &ReportPeriod,
    ) -> Result<Vec<CheckinRow>>;

    /// Fetch notifications delivered to the client's user inside the period
    async fn fetch_notifications(
        &self,
        user_id: &str,
        period: &ReportPeriod,
    ) -> Result<Vec<NotificationRow>>;

    /// Fetch the most recent clinician review inside the period
    async fn fetch_latest_review(
        &self,
        clinic_id: &ClinicId,
        client_id: &ClientId,
        period: &ReportPeriod,
    ) -> Result<Option<LatestReview>>;

    /// Fetch assignments touched in the period across a whole clinic
    async fn fetch_clinic_assignments(
        &self,
        clinic_id: &ClinicId,
        period: &ReportPeriod,
    ) -> Result<Vec<AssignmentRow>>;

    /// Fetch submissions inside the period across a whole clinic
    async fn fetch_clinic_submissions(
        &self,
        clinic_id: &ClinicId,
        period: &ReportPeriod,
    ) -> Result<Vec<SubmissionRow>>;

    /// Fetch check-ins inside the period across a whole clinic
    async fn fetch_clinic_checkins(
        &self,
        clinic_id: &ClinicId,
        period: &ReportPeriod,
    ) -> Result<Vec<CheckinRow>>;
}
