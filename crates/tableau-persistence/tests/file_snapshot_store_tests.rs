//! Integration tests for `FileSnapshotStore`.

use chrono::NaiveDate;
use tableau_core::error::PersistenceError;
use tableau_core::slot::SlotId;
use tableau_core::snapshot::SessionSnapshot;
use tableau_core::store::{SnapshotStore, first_empty_slot};
use tableau_persistence::FileSnapshotStore;

/// Helper to build a snapshot with a fixed timestamp.
fn make_snapshot(context: &str, position: u32, elapsed: f64) -> SessionSnapshot {
    let saved_at = NaiveDate::from_ymd_opt(2026, 1, 15)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    SessionSnapshot::new(context, position, elapsed, saved_at)
}

fn slot(index: u8) -> SlotId {
    SlotId::new(index).unwrap()
}

// --- write + read round-trip ---

#[tokio::test]
async fn test_write_then_read_round_trips_all_fields() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::open(temp.path()).await.unwrap();
    let snapshot = make_snapshot("ChapterOne", 7, 125.5);

    store.write(slot(0), &snapshot).await.unwrap();
    let loaded = store.read(slot(0)).await.unwrap();

    assert_eq!(loaded, snapshot);
    assert_eq!(loaded.saved_at, "2026-01-15 10:00:00");
}

#[tokio::test]
async fn test_file_contents_match_documented_layout() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::open(temp.path()).await.unwrap();

    store
        .write(slot(2), &make_snapshot("ChapterOne", 7, 125.5))
        .await
        .unwrap();

    let contents = std::fs::read_to_string(temp.path().join("SaveSlot_2.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value["sceneName"], "ChapterOne");
    assert_eq!(value["dialogueIndex"], 7);
    assert_eq!(value["playTimeSeconds"], 125.5);
    assert_eq!(value["savedAt"], "2026-01-15 10:00:00");
}

#[tokio::test]
async fn test_write_overwrites_existing_snapshot() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::open(temp.path()).await.unwrap();

    store.write(slot(1), &make_snapshot("A", 1, 1.0)).await.unwrap();
    store.write(slot(1), &make_snapshot("B", 2, 2.0)).await.unwrap();

    let loaded = store.read(slot(1)).await.unwrap();
    assert_eq!(loaded.context_name, "B");
    assert!(!temp.path().join("SaveSlot_1.json.tmp").exists());
}

// --- read failures ---

#[tokio::test]
async fn test_read_empty_slot_returns_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::open(temp.path()).await.unwrap();

    let result = store.read(slot(0)).await;

    match result {
        Err(PersistenceError::NotFound(s)) => assert_eq!(s, slot(0)),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_read_garbage_returns_corrupt() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::open(temp.path()).await.unwrap();
    std::fs::write(temp.path().join("SaveSlot_0.json"), "{ not json").unwrap();

    let result = store.read(slot(0)).await;

    assert!(matches!(result, Err(PersistenceError::Corrupt { .. })));
}

// --- write failures ---

#[tokio::test]
async fn test_failed_write_leaves_canonical_file_untouched() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::open(temp.path()).await.unwrap();
    let original = make_snapshot("Original", 3, 10.0);
    store.write(slot(0), &original).await.unwrap();
    // A directory squatting on the temp path makes the temp write fail.
    std::fs::create_dir(temp.path().join("SaveSlot_0.json.tmp")).unwrap();

    let result = store.write(slot(0), &make_snapshot("Replacement", 9, 99.0)).await;

    assert!(matches!(result, Err(PersistenceError::WriteFailed { .. })));
    assert_eq!(store.read(slot(0)).await.unwrap(), original);
}

// --- delete ---

#[tokio::test]
async fn test_delete_removes_snapshot() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::open(temp.path()).await.unwrap();
    store.write(slot(0), &make_snapshot("A", 0, 0.0)).await.unwrap();

    store.delete(slot(0)).await.unwrap();

    assert!(!store.exists(slot(0)).await);
}

#[tokio::test]
async fn test_delete_empty_slot_is_idempotent() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::open(temp.path()).await.unwrap();

    store.delete(slot(1)).await.unwrap();
    store.delete(slot(1)).await.unwrap();

    assert!(!store.exists(slot(1)).await);
}

// --- labels ---

#[tokio::test]
async fn test_label_describes_full_and_empty_slots() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::open(temp.path()).await.unwrap();
    store
        .write(slot(0), &make_snapshot("ChapterOne", 7, 125.5))
        .await
        .unwrap();

    assert_eq!(
        store.label(slot(0)).await,
        "Slot 1 - ChapterOne (2026-01-15 10:00:00)"
    );
    assert_eq!(store.label(slot(1)).await, "Slot 2 - Empty");
}

#[tokio::test]
async fn test_label_of_corrupt_slot_falls_back_to_empty() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::open(temp.path()).await.unwrap();
    std::fs::write(temp.path().join("SaveSlot_2.json"), "[]").unwrap();

    assert_eq!(store.label(slot(2)).await, "Slot 3 - Empty");
}

// --- housekeeping ---

#[tokio::test]
async fn test_open_sweeps_stale_temp_files() {
    let temp = tempfile::tempdir().expect("tempdir");
    let stale = temp.path().join("SaveSlot_1.json.tmp");
    std::fs::write(&stale, "half a snap").unwrap();

    let _store = FileSnapshotStore::open(temp.path()).await.unwrap();

    assert!(!stale.exists());
}

#[tokio::test]
async fn test_open_creates_missing_directory() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("nested").join("saves");

    let store = FileSnapshotStore::open(&root).await.unwrap();
    store.write(slot(0), &make_snapshot("A", 0, 0.0)).await.unwrap();

    assert!(root.join("SaveSlot_0.json").exists());
}

#[tokio::test]
async fn test_first_empty_slot_skips_full_slots() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::open(temp.path()).await.unwrap();
    store.write(slot(0), &make_snapshot("A", 0, 0.0)).await.unwrap();

    assert_eq!(first_empty_slot(&store).await, Some(slot(1)));

    store.write(slot(1), &make_snapshot("A", 0, 0.0)).await.unwrap();
    store.write(slot(2), &make_snapshot("A", 0, 0.0)).await.unwrap();
    assert_eq!(first_empty_slot(&store).await, None);
}
