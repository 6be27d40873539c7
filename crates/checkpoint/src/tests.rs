//! Unit tests for the checkpoint crate.

use tempfile::TempDir;

use crate::{CheckpointStore, FileStore, MemoryStore, Sequence};

// ============================================================================
// Sequence Tests
// ============================================================================

#[test]
fn test_sequence_deserializes_from_string() {
    let seq: Sequence = serde_json::from_str("\"5-g1AAAABXeJzLY\"").unwrap();
    assert_eq!(seq.as_str(), "5-g1AAAABXeJzLY");
}

#[test]
fn test_sequence_deserializes_from_number() {
    // CouchDB 1.x reports sequences as plain integers.
    let seq: Sequence = serde_json::from_str("42").unwrap();
    assert_eq!(seq.as_str(), "42");
}

#[test]
fn test_sequence_rejects_other_json_types() {
    assert!(serde_json::from_str::<Sequence>("[1, 2]").is_err());
    assert!(serde_json::from_str::<Sequence>("null").is_err());
}

#[test]
fn test_sequence_serializes_as_raw_token() {
    let seq = Sequence::new("17-abcdef");
    assert_eq!(serde_json::to_string(&seq).unwrap(), "\"17-abcdef\"");
}

#[test]
fn test_sequence_display() {
    assert_eq!(format!("{}", Sequence::new("9")), "9");
}

// ============================================================================
// FileStore Tests
// ============================================================================

#[tokio::test]
async fn test_file_store_save_load_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::new(tmp.path().join(".checkpoint"));

    store.save(&Sequence::new("23-xyz")).await.unwrap();
    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, Some(Sequence::new("23-xyz")));
}

#[tokio::test]
async fn test_file_store_save_overwrites_previous_value() {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::new(tmp.path().join(".checkpoint"));

    store.save(&Sequence::new("1")).await.unwrap();
    store.save(&Sequence::new("2")).await.unwrap();

    assert_eq!(store.load().await.unwrap(), Some(Sequence::new("2")));

    // The entire file is the token, nothing appended.
    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(raw, "2");
}

#[tokio::test]
async fn test_file_store_load_absent_file_returns_none() {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::new(tmp.path().join(".checkpoint"));

    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn test_file_store_load_empty_file_returns_none() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(".checkpoint");
    std::fs::write(&path, "").unwrap();

    let store = FileStore::new(&path);
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn test_file_store_leaves_no_temp_files_behind() {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::new(tmp.path().join(".checkpoint"));

    store.save(&Sequence::new("100")).await.unwrap();

    let entries: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from(".checkpoint")]);
}

#[tokio::test]
async fn test_file_store_relative_path_without_parent() {
    let tmp = TempDir::new().unwrap();
    let prev = std::env::current_dir().unwrap();
    std::env::set_current_dir(tmp.path()).unwrap();

    let store = FileStore::new(".checkpoint");
    store.save(&Sequence::new("7")).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(Sequence::new("7")));

    std::env::set_current_dir(prev).unwrap();
}

// ============================================================================
// MemoryStore Tests
// ============================================================================

#[tokio::test]
async fn test_memory_store_records_save_history() {
    let store = MemoryStore::new();
    assert_eq!(store.load().await.unwrap(), None);

    store.save(&Sequence::new("1")).await.unwrap();
    store.save(&Sequence::new("2")).await.unwrap();

    assert_eq!(store.load().await.unwrap(), Some(Sequence::new("2")));
    assert_eq!(
        store.history(),
        vec![Sequence::new("1"), Sequence::new("2")]
    );
}
