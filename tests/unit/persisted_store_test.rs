//! Tests for the JSON record store and the data-directory layout.

use browsershell::storage::{JsonStore, StorePaths};
use browsershell::types::errors::StoreError;
use tempfile::TempDir;

#[test]
fn test_missing_file_loads_as_none() {
    let dir = TempDir::new().unwrap();
    let store: JsonStore<Vec<String>> = JsonStore::new(dir.path().join("bookmarks.json"));

    assert!(!store.exists());
    assert_eq!(store.load().unwrap(), None);
    assert!(store.load_or_default().is_empty());
}

#[test]
fn test_save_then_load_returns_same_value() {
    let dir = TempDir::new().unwrap();
    let store: JsonStore<Vec<String>> = JsonStore::new(dir.path().join("bookmarks.json"));
    let urls = vec!["https://a.test".to_string(), "https://b.test".to_string()];

    store.save(&urls).unwrap();

    assert!(store.exists());
    assert_eq!(store.load().unwrap(), Some(urls));
}

#[test]
fn test_corrupt_file_is_an_error_and_defaults_on_fallback() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bookmarks.json");
    std::fs::write(&path, "{ not json").unwrap();
    let store: JsonStore<Vec<String>> = JsonStore::new(&path);

    assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    assert!(store.load_or_default().is_empty());
}

#[test]
fn test_wrong_shape_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bookmarks.json");
    std::fs::write(&path, r#"{"Url": "https://a.test"}"#).unwrap();
    let store: JsonStore<Vec<String>> = JsonStore::new(&path);

    assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
}

#[test]
fn test_store_paths_layout() {
    let paths = StorePaths::new("/data/profile");
    assert_eq!(paths.bookmarks(), std::path::Path::new("/data/profile/bookmarks.json"));
    assert_eq!(paths.history(), std::path::Path::new("/data/profile/history.json"));
    assert_eq!(paths.tab_groups(), std::path::Path::new("/data/profile/tab_groups.json"));
    assert_eq!(paths.session(), std::path::Path::new("/data/profile/session.json"));
    assert_eq!(paths.sync(), std::path::Path::new("/data/profile/cloud_sync.json"));
    assert_eq!(paths.settings(), std::path::Path::new("/data/profile/settings.json"));
}
