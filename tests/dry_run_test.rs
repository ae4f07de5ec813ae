//! Dry-run behavior of the generate command
//!
//! A dry run must exercise the full pipeline (so failures surface) while
//! guaranteeing nothing is written to the output directory.

use aer::cli::commands::generate::GenerateArgs;
use tempfile::TempDir;
use tokio::sync::watch;

const SNAPSHOT: &str = r#"{
    "clinics": [ { "id": "clinic-1", "name": "Lakeside Clinic" } ],
    "clients": [ { "id": "client-1", "user_id": "user-c1", "clinic_id": "clinic-1" } ],
    "assignments": [
        {
            "id": "a1",
            "client_id": "client-1",
            "clinic_id": "clinic-1",
            "created_at": "2026-01-02T08:00:00.000Z",
            "due_date": "2026-01-10T00:00:00.000Z"
        }
    ],
    "submissions": [],
    "feedback": [],
    "checkins": [],
    "notifications": []
}"#;

/// Writes a snapshot and a config pointing at it, returns the config path.
fn setup(dir: &TempDir, overwrite: bool) -> String {
    let snapshot_path = dir.path().join("snapshot.json");
    std::fs::write(&snapshot_path, SNAPSHOT).unwrap();

    let out_dir = dir.path().join("out");
    let config = format!(
        "[source]\nsnapshot_path = \"{}\"\n\n[output]\ndirectory = \"{}\"\noverwrite = {}\n",
        snapshot_path.display(),
        out_dir.display(),
        overwrite
    );
    let config_path = dir.path().join("aer.toml");
    std::fs::write(&config_path, &config).unwrap();
    config_path.to_string_lossy().to_string()
}

fn args(dry_run: bool, json_only: bool) -> GenerateArgs {
    GenerateArgs {
        clinic_id: "clinic-1".to_string(),
        client_id: "client-1".to_string(),
        start: "2026-01-01".to_string(),
        end: "2026-01-31".to_string(),
        program: None,
        output: None,
        json_only,
        dry_run,
    }
}

fn shutdown() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config_path = setup(&dir, false);

    let code = args(true, false).execute(&config_path, shutdown()).await.unwrap();
    assert_eq!(code, 0);
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_dry_run_json_only_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config_path = setup(&dir, false);

    let code = args(true, true).execute(&config_path, shutdown()).await.unwrap();
    assert_eq!(code, 0);
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_real_run_writes_bundle() {
    let dir = TempDir::new().unwrap();
    let config_path = setup(&dir, false);

    let code = args(false, false).execute(&config_path, shutdown()).await.unwrap();
    assert_eq!(code, 0);

    let bundle = dir
        .path()
        .join("out")
        .join("AER_BUNDLE_clinic-1_client-1_2026-01-01_2026-01-31.zip");
    assert!(bundle.exists());
    let bytes = std::fs::read(&bundle).unwrap();
    // Store-only ZIP local header signature.
    assert_eq!(&bytes[0..4], &[0x50, 0x4b, 0x03, 0x04]);
}

#[tokio::test]
async fn test_real_run_json_only_writes_report() {
    let dir = TempDir::new().unwrap();
    let config_path = setup(&dir, false);

    let code = args(false, true).execute(&config_path, shutdown()).await.unwrap();
    assert_eq!(code, 0);

    let report = dir
        .path()
        .join("out")
        .join("AER_clinic-1_client-1_2026-01-01_2026-01-31.json");
    let bytes = std::fs::read(&report).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["meta"]["report_type"], "AER");
    // JSON-only reports pin generated_at the same way bundles do.
    assert_eq!(value["meta"]["generated_at"], "2026-01-31T23:59:59.999Z");
}

#[tokio::test]
async fn test_existing_artifact_refused_without_overwrite() {
    let dir = TempDir::new().unwrap();
    let config_path = setup(&dir, false);

    assert_eq!(
        args(false, false).execute(&config_path, shutdown()).await.unwrap(),
        0
    );
    // Second run hits the existing bundle.
    assert_eq!(
        args(false, false).execute(&config_path, shutdown()).await.unwrap(),
        2
    );
}

#[tokio::test]
async fn test_existing_artifact_replaced_with_overwrite() {
    let dir = TempDir::new().unwrap();
    let config_path = setup(&dir, true);

    assert_eq!(
        args(false, false).execute(&config_path, shutdown()).await.unwrap(),
        0
    );
    assert_eq!(
        args(false, false).execute(&config_path, shutdown()).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_missing_config_is_configuration_error() {
    let code = args(false, false)
        .execute("no-such-config.toml", shutdown())
        .await
        .unwrap();
    assert_eq!(code, 2);
}

#[tokio::test]
async fn test_unknown_client_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config_path = setup(&dir, false);

    let mut a = args(false, false);
    a.client_id = "client-999".to_string();
    let code = a.execute(&config_path, shutdown()).await.unwrap();
    assert_eq!(code, 5);
}
