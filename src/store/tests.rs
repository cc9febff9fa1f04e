//! Tests for store module

use super::*;
use serde_json::json;
use tempfile::tempdir;

// ============================================================================
// Key Tests
// ============================================================================

#[test]
fn test_validate_key() {
    assert!(validate_key("posts_-1").is_ok());
    assert!(validate_key("").is_err());
    assert!(validate_key("..").is_err());
    assert!(validate_key("../escape").is_err());
    assert!(validate_key("a\\b").is_err());
}

// ============================================================================
// MemoryStore Tests
// ============================================================================

#[tokio::test]
async fn test_memory_store_round_trip() {
    let store = MemoryStore::new();
    assert!(store.is_empty().await);
    assert!(store.load("wall").await.unwrap().is_none());

    store.save("wall", &json!({"loaded_count": 3})).await.unwrap();
    store.save("wall", &json!({"loaded_count": 5})).await.unwrap();

    assert_eq!(store.len().await, 1);
    assert_eq!(
        store.load("wall").await.unwrap(),
        Some(json!({"loaded_count": 5}))
    );
}

#[tokio::test]
async fn test_memory_store_clones_share_records() {
    let store = MemoryStore::new();
    let other = store.clone();
    other.save("likes", &json!([])).await.unwrap();
    store.save("members", &json!([])).await.unwrap();
    assert_eq!(store.keys().await.unwrap(), vec!["likes", "members"]);
}

// ============================================================================
// JsonFileStore Tests
// ============================================================================

#[tokio::test]
async fn test_file_store_round_trip() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("out"));
    let record = json!({"state": "done", "data": {"items": [{"id": 1}]}});

    store.save("posts_-1", &record).await.unwrap();

    let path = store.path_for("posts_-1").unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());
    assert_eq!(store.load("posts_-1").await.unwrap(), Some(record));
}

#[tokio::test]
async fn test_file_store_missing_record() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    assert!(store.load("absent").await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_store_keys() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    assert!(JsonFileStore::new(dir.path().join("missing"))
        .keys()
        .await
        .unwrap()
        .is_empty());

    store.save("b", &json!(2)).await.unwrap();
    store.save("a", &json!(1)).await.unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_file_store_corrupt_record() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

    let err = store.load("broken").await.unwrap_err();
    assert!(matches!(err, Error::Store { .. }));
}

#[tokio::test]
async fn test_file_store_rejects_path_keys() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    assert!(store.save("../outside", &json!(1)).await.is_err());
}
