//! End-to-end bundle generation and verification
//!
//! Exercises the full path a deployment takes: a JSON snapshot export on
//! disk, loaded through the snapshot adapter, compiled into a bundle, then
//! re-opened and verified from the archive bytes alone.

use std::sync::Arc;

use aer::adapters::source::SnapshotSource;
use aer::cli::commands::verify::verify_bundle;
use aer::core::archive::{entry_data, unpack_archive};
use aer::core::bundle::{bundle_filename, BundleBuilder};
use aer::core::report::ReportRequest;
use aer::core::verification::sha256_hex;
use aer::domain::period::ReportPeriod;
use aer::domain::report::AerReport;
use aer::domain::AerError;
use tempfile::TempDir;

/// A small but complete snapshot: one clinic, one client, two assignments
/// (one completed late, one missed), a check-in, feedback, and a reminder.
const SNAPSHOT: &str = r#"{
    "clinics": [
        { "id": "clinic-1", "name": "Lakeside Clinic" }
    ],
    "clients": [
        { "id": "client-1", "user_id": "user-c1", "clinic_id": "clinic-1" }
    ],
    "assignments": [
        {
            "id": "a1",
            "client_id": "client-1",
            "clinic_id": "clinic-1",
            "title": "Thought record",
            "created_at": "2026-01-02T08:00:00.000Z",
            "due_date": "2026-01-08T00:00:00.000Z",
            "therapist": { "user_id": "user-t1", "full_name": "Dana Reyes" }
        },
        {
            "id": "a2",
            "client_id": "client-1",
            "clinic_id": "clinic-1",
            "title": "Sleep diary",
            "created_at": "2026-01-03T08:00:00.000Z",
            "due_date": "2026-01-20T00:00:00.000Z"
        }
    ],
    "submissions": [
        {
            "id": "r1",
            "assignment_id": "a1",
            "client_id": "client-1",
            "created_at": "2026-01-09T09:00:00.000Z",
            "mood": 4,
            "reviewed_at": "2026-01-10T10:00:00.000Z",
            "reviewed_by": { "user_id": "user-t1", "full_name": "Dana Reyes" }
        }
    ],
    "feedback": [
        {
            "id": "f1",
            "response_id": "r1",
            "assignment_id": "a1",
            "client_id": "client-1",
            "created_at": "2026-01-10T10:05:00.000Z",
            "therapist": { "user_id": "user-t1", "full_name": "Dana Reyes" }
        }
    ],
    "checkins": [
        { "id": "chk-1", "client_id": "client-1", "created_at": "2026-01-05T20:00:00.000Z", "mood": 3 }
    ],
    "notifications": [
        {
            "id": "n1",
            "user_id": "user-c1",
            "type": "assignment_due_24h",
            "dedupe_key": "assignment:a1:reminder:24h",
            "channel": "email",
            "created_at": "2026-01-07T00:00:00.000Z"
        }
    ]
}"#;

async fn source_from_disk(dir: &TempDir) -> Arc<SnapshotSource> {
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, SNAPSHOT).unwrap();
    Arc::new(SnapshotSource::load(&path).await.unwrap())
}

fn request() -> ReportRequest {
    ReportRequest {
        clinic_id: "clinic-1".parse().unwrap(),
        client_id: "client-1".parse().unwrap(),
        period: ReportPeriod::from_labels("2026-01-01", "2026-01-31").unwrap(),
        program: None,
        generated_at_override: None,
    }
}

#[tokio::test]
async fn test_generate_and_verify_round_trip() {
    let dir = TempDir::new().unwrap();
    let source = source_from_disk(&dir).await;
    let outcome = BundleBuilder::new(source).generate(&request()).await.unwrap();

    let verified = verify_bundle(&outcome.buffer).unwrap();
    assert_eq!(
        verified.report_id,
        "AER-v1:clinic-1:client-1:2026-01-01:2026-01-31"
    );
    assert_eq!(verified.json_hash, outcome.json_hash);
    assert_eq!(verified.pdf_hash, outcome.pdf_hash);
}

#[tokio::test]
async fn test_archive_layout_and_hashes() {
    let dir = TempDir::new().unwrap();
    let source = source_from_disk(&dir).await;
    let outcome = BundleBuilder::new(source).generate(&request()).await.unwrap();

    let files = unpack_archive(&outcome.buffer).unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["AER.json", "AER.pdf", "verification.txt"]);

    let json = entry_data(&files, "AER.json").unwrap();
    let pdf = entry_data(&files, "AER.pdf").unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4"));
    assert_eq!(sha256_hex(json), outcome.json_hash);
    assert_eq!(sha256_hex(pdf), outcome.pdf_hash);

    let manifest = String::from_utf8(entry_data(&files, "verification.txt").unwrap().to_vec())
        .unwrap();
    let keys: Vec<&str> = manifest
        .lines()
        .map(|line| line.split_once('=').map(|(k, _)| k).unwrap_or(line))
        .collect();
    assert_eq!(
        keys,
        vec![
            "REPORT_ID",
            "GENERATED_AT",
            "META_VERIFICATION",
            "JSON_SHA256",
            "PDF_SHA256",
            "NOTE"
        ]
    );
    assert!(!manifest.ends_with('\n'));
}

#[tokio::test]
async fn test_report_content_from_snapshot() {
    let dir = TempDir::new().unwrap();
    let source = source_from_disk(&dir).await;
    let outcome = BundleBuilder::new(source).generate(&request()).await.unwrap();

    let files = unpack_archive(&outcome.buffer).unwrap();
    let report: AerReport =
        serde_json::from_slice(entry_data(&files, "AER.json").unwrap()).unwrap();

    assert_eq!(report.context.clinic.name.as_deref(), Some("Lakeside Clinic"));
    assert_eq!(report.prescribed_interventions.len(), 2);

    // a1 was submitted after its due date.
    let a1 = &report.prescribed_interventions[0];
    assert_eq!(a1.assignment_id, "a1");
    assert_eq!(a1.status_summary.completed, 1);
    assert_eq!(a1.status_summary.late, 1);
    assert_eq!(a1.evidence_refs, vec!["r1".to_string()]);

    // a2 got no submission and its due date fell inside the period.
    let a2 = &report.prescribed_interventions[1];
    assert_eq!(a2.status_summary.missed, 1);
    assert_eq!(a2.status_summary.completed, 0);

    // Timeline carries every stream plus the synthetic missed event.
    let kinds: Vec<&str> = report
        .adherence_timeline
        .iter()
        .map(|e| e.kind.as_str())
        .collect();
    assert!(kinds.contains(&"assignment_completed"));
    assert!(kinds.contains(&"assignment_missed"));
    assert!(kinds.contains(&"checkin"));
    assert!(kinds.contains(&"feedback"));
    assert!(kinds.contains(&"notification_sent"));

    assert_eq!(report.noncompliance_escalations.len(), 1);
    assert_eq!(report.noncompliance_escalations[0].kind.as_str(), "reminder");
    assert_eq!(
        report.noncompliance_escalations[0].channel.as_str(),
        "email"
    );
    assert!(!report
        .not_available
        .iter()
        .any(|entry| entry.contains("noncompliance_escalations.channel")));

    assert!(report.clinician_review.reviewed);
    assert_eq!(
        report.clinician_review.reviewed_by.name.as_deref(),
        Some("Dana Reyes")
    );
}

#[tokio::test]
async fn test_regenerating_from_same_snapshot_is_byte_identical() {
    let dir = TempDir::new().unwrap();

    let first = BundleBuilder::new(source_from_disk(&dir).await)
        .generate(&request())
        .await
        .unwrap();
    let second = BundleBuilder::new(source_from_disk(&dir).await)
        .generate(&request())
        .await
        .unwrap();

    assert_eq!(first.buffer, second.buffer);
    assert_eq!(first.json_hash, second.json_hash);
    assert_eq!(first.pdf_hash, second.pdf_hash);
}

#[tokio::test]
async fn test_tampered_bundle_fails_verification() {
    let dir = TempDir::new().unwrap();
    let source = source_from_disk(&dir).await;
    let mut bytes = BundleBuilder::new(source)
        .generate(&request())
        .await
        .unwrap()
        .buffer;

    let probe = bytes
        .windows(5)
        .position(|w| w == b"\"AER\"")
        .expect("report type literal present");
    bytes[probe + 1] = b'X';

    let err = verify_bundle(&bytes).unwrap_err();
    assert!(matches!(err, AerError::Verification(_)));
}

#[tokio::test]
async fn test_unknown_client_is_not_found() {
    let dir = TempDir::new().unwrap();
    let source = source_from_disk(&dir).await;

    let mut req = request();
    req.client_id = "client-999".parse().unwrap();
    let err = BundleBuilder::new(source).generate(&req).await.unwrap_err();
    assert!(matches!(err, AerError::NotFound(_)));
}

#[tokio::test]
async fn test_client_from_other_clinic_is_forbidden() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    let snapshot = SNAPSHOT.replace(
        r#"{ "id": "clinic-1", "name": "Lakeside Clinic" }"#,
        r#"{ "id": "clinic-1", "name": "Lakeside Clinic" }, { "id": "clinic-2", "name": null }"#,
    );
    std::fs::write(&path, snapshot).unwrap();
    let source = Arc::new(SnapshotSource::load(&path).await.unwrap());

    let mut req = request();
    req.clinic_id = "clinic-2".parse().unwrap();
    let err = BundleBuilder::new(source).generate(&req).await.unwrap_err();
    assert!(matches!(err, AerError::Forbidden(_)));
}

#[test]
fn test_bundle_filename_shape() {
    assert_eq!(
        bundle_filename(&request()),
        "AER_BUNDLE_clinic-1_client-1_2026-01-01_2026-01-31.zip"
    );
}
