//! Integration tests for KPM CLI commands.
//!
//! Uses tempfile for testing file-based operations.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use kpm::cli::{cmd_allocate, cmd_init, cmd_players, cmd_save, cmd_status, CliError};
use kpm_core::{roster, KpmError, RedbStore, RosterStore};
use std::path::PathBuf;
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a temporary directory for tests.
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Create a sample submission JSON file.
fn create_submission(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("players.json");
    let content = r#"{
        "data": [
            {"year": 2024, "players": [
                {"id": "p1", "masterId": "m1", "name": "Asha", "branch": "CSE", "diplomaYear": 1, "semester": "1"},
                {"id": "p2", "masterId": "m2", "name": "Ravi", "branch": "ME", "diplomaYear": "2", "semester": "3", "kpmNo": "242307"},
                {"id": "p3", "masterId": "m3", "name": "Meena", "branch": "EE", "diplomaYear": 3, "semester": "6"}
            ]},
            {"year": 2023, "players": [
                {"id": "p0", "masterId": "m1", "name": "Asha", "branch": "CSE", "diplomaYear": 1, "semester": "1", "status": "COMPLETED", "kpmNo": "231112"}
            ]}
        ]
    }"#;
    std::fs::write(&path, content).unwrap();
    path
}

fn init_db(dir: &TempDir) -> PathBuf {
    let db_path = dir.path().join("kpm.redb");
    cmd_init(&db_path, false).unwrap();
    db_path
}

// =============================================================================
// INIT COMMAND TESTS
// =============================================================================

#[test]
fn test_init_creates_database() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("kpm.redb");

    let result = cmd_init(&db_path, false);
    assert!(result.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_init_fails_if_exists_without_force() {
    let temp = create_temp_dir();
    let db_path = init_db(&temp);

    let result = cmd_init(&db_path, false);
    assert!(matches!(result, Err(CliError::AlreadyExists(_))));
}

#[test]
fn test_init_with_force_resets_roster() {
    let temp = create_temp_dir();
    let db_path = init_db(&temp);
    cmd_save(&db_path, &create_submission(&temp)).unwrap();

    cmd_init(&db_path, true).unwrap();

    let store = RedbStore::open(&db_path).unwrap();
    assert!(store.load_roster().unwrap().is_empty());
    assert!(store.load_pool().unwrap().is_none());
}

// =============================================================================
// SAVE COMMAND TESTS
// =============================================================================

#[test]
fn test_save_assigns_and_persists_codes() {
    let temp = create_temp_dir();
    let db_path = init_db(&temp);

    cmd_save(&db_path, &create_submission(&temp)).unwrap();

    let store = RedbStore::open(&db_path).unwrap();
    let players = store.load_roster().unwrap();
    let codes: Vec<(&str, &str)> = players
        .iter()
        .map(|p| (p.player_id(), p.candidate.code.as_str()))
        .collect();

    // Asha keeps her 2023 sequence 12, Ravi keeps 07, Meena graduates.
    assert_eq!(
        codes,
        vec![("p1", "241112"), ("p2", "242307"), ("p3", ""), ("p0", "")]
    );

    let pool = store.load_pool().unwrap().unwrap();
    assert_eq!(pool.allocated, vec![7, 12]);
}

#[test]
fn test_save_invalid_json() {
    let temp = create_temp_dir();
    let db_path = init_db(&temp);
    let bad_file = temp.path().join("bad.json");
    std::fs::write(&bad_file, "not valid json").unwrap();

    let result = cmd_save(&db_path, &bad_file);
    assert!(matches!(result, Err(CliError::Json(_))));
}

#[test]
fn test_save_empty_submission() {
    let temp = create_temp_dir();
    let db_path = init_db(&temp);
    let file = temp.path().join("empty.json");
    std::fs::write(&file, r#"{"data": [{"year": 2024, "players": [{"name": "", "branch": "CSE"}]}]}"#)
        .unwrap();

    let result = cmd_save(&db_path, &file);
    assert!(matches!(result, Err(CliError::Kpm(KpmError::EmptySubmission))));
}

#[test]
fn test_save_over_capacity_keeps_previous_roster() {
    let temp = create_temp_dir();
    let db_path = init_db(&temp);
    cmd_save(&db_path, &create_submission(&temp)).unwrap();

    let players: Vec<String> = (0..100)
        .map(|i| format!(r#"{{"masterId": "x{i}", "name": "N{i}", "branch": "B"}}"#))
        .collect();
    let file = temp.path().join("big.json");
    std::fs::write(
        &file,
        format!(r#"{{"data": [{{"year": 2025, "players": [{}]}}]}}"#, players.join(",")),
    )
    .unwrap();

    let result = cmd_save(&db_path, &file);
    assert!(matches!(result, Err(CliError::Kpm(KpmError::CapacityExhausted))));

    let store = RedbStore::open(&db_path).unwrap();
    assert_eq!(store.load_roster().unwrap().len(), 4);
}

// =============================================================================
// STATUS / PLAYERS COMMAND TESTS
// =============================================================================

#[test]
fn test_status_empty_database() {
    let temp = create_temp_dir();
    let db_path = init_db(&temp);

    assert!(cmd_status(&db_path, false).is_ok());
    assert!(cmd_status(&db_path, true).is_ok());
}

#[test]
fn test_status_after_save() {
    let temp = create_temp_dir();
    let db_path = init_db(&temp);
    cmd_save(&db_path, &create_submission(&temp)).unwrap();

    assert!(cmd_status(&db_path, true).is_ok());

    let store = RedbStore::open(&db_path).unwrap();
    let status = roster::pool_status(&store).unwrap();
    assert_eq!((status.allocated, status.available, status.usage_percent), (2, 97, 2));
}

#[test]
fn test_players_all_modes() {
    let temp = create_temp_dir();
    let db_path = init_db(&temp);
    cmd_save(&db_path, &create_submission(&temp)).unwrap();

    assert!(cmd_players(&db_path, None, false).is_ok());
    assert!(cmd_players(&db_path, None, true).is_ok());
    assert!(cmd_players(&db_path, Some(2024), false).is_ok());
    assert!(cmd_players(&db_path, Some(2024), true).is_ok());
}

// =============================================================================
// ALLOCATE (DRY RUN) TESTS
// =============================================================================

#[test]
fn test_allocate_writes_report() {
    let temp = create_temp_dir();
    let input = temp.path().join("candidates.json");
    let output = temp.path().join("allocation.json");
    std::fs::write(
        &input,
        r#"[
            {"row_key": "r1", "identity": "A", "year": 2024, "diploma_year": 1, "semester": "1"},
            {"row_key": "r2", "year": 2024, "diploma_year": 2, "semester": "4", "code": "242499"},
            {"row_key": "r3", "year": 2024, "diploma_year": 1, "semester": "2", "status": "DROPPED", "code": "241205"}
        ]"#,
    )
    .unwrap();

    cmd_allocate(&input, Some(&output)).unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let codes: Vec<&str> = report["roster"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["241101", "242499", ""]);
    assert_eq!(report["pool"]["allocated"], serde_json::json!([1, 99]));
}

#[test]
fn test_allocate_accepts_loose_fields() {
    let temp = create_temp_dir();
    let input = temp.path().join("candidates.json");
    let output = temp.path().join("allocation.json");
    std::fs::write(
        &input,
        r#"[
            {"row_key": "r1", "year": 2024, "diploma_year": "2", "semester": 1, "status": "graduated"},
            {"row_key": "r2", "year": "2024", "diploma_year": 1, "semester": "3", "status": "active", "code": 241307}
        ]"#,
    )
    .unwrap();

    cmd_allocate(&input, Some(&output)).unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let roster = report["roster"].as_array().unwrap();
    assert_eq!(roster[0]["status"], "ACTIVE");
    assert_eq!(roster[0]["code"], "242101");
    assert_eq!(roster[1]["code"], "241307");
}

#[test]
fn test_allocate_missing_file() {
    let temp = create_temp_dir();
    let result = cmd_allocate(&temp.path().join("missing.json"), None);
    assert!(matches!(result, Err(CliError::Io(_))));
}

#[test]
fn test_allocate_is_deterministic() {
    let temp = create_temp_dir();
    let input = temp.path().join("candidates.json");
    let out1 = temp.path().join("a.json");
    let out2 = temp.path().join("b.json");
    std::fs::write(
        &input,
        r#"[
            {"row_key": "r1", "identity": "A", "year": 2024, "diploma_year": 1, "semester": "1", "code": "241150"},
            {"row_key": "r2", "identity": "B", "year": 2024, "diploma_year": 1, "semester": "1", "code": "241150"}
        ]"#,
    )
    .unwrap();

    cmd_allocate(&input, Some(&out1)).unwrap();
    cmd_allocate(&input, Some(&out2)).unwrap();

    let data1 = std::fs::read(&out1).unwrap();
    let data2 = std::fs::read(&out2).unwrap();
    assert_eq!(data1, data2, "Allocation should be deterministic");
}
