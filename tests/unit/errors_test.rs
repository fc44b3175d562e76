use browsershell::types::errors::*;

// === StoreError Tests ===

#[test]
fn store_error_display_variants() {
    assert_eq!(
        StoreError::Io("permission denied".to_string()).to_string(),
        "Store I/O error: permission denied"
    );
    assert_eq!(
        StoreError::Corrupt("expected value at line 1".to_string()).to_string(),
        "Store file is corrupt: expected value at line 1"
    );
}

#[test]
fn store_error_converts_into_component_errors() {
    let err: BookmarkError = StoreError::Io("disk full".to_string()).into();
    assert_eq!(err.to_string(), "Bookmark storage error: Store I/O error: disk full");

    let err: SessionError = StoreError::Corrupt("eof".to_string()).into();
    assert!(matches!(err, SessionError::Storage(_)));

    let err: HistoryError = StoreError::Io("x".to_string()).into();
    assert!(err.to_string().starts_with("History storage error"));

    let err: TabGroupError = StoreError::Io("x".to_string()).into();
    assert!(matches!(err, TabGroupError::Storage(_)));
}

// === TabError Tests ===

#[test]
fn tab_error_display_variants() {
    assert_eq!(TabError::NotFound("tab-123".to_string()).to_string(), "Tab not found: tab-123");
    assert_eq!(TabError::LastTab.to_string(), "Cannot close the last tab");
    assert_eq!(TabError::Pinned("tab-1".to_string()).to_string(), "Tab is pinned: tab-1");
}

#[test]
fn tab_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(TabError::NotFound("id".to_string()));
    assert!(err.source().is_none());
}

// === ValidationError Tests ===

#[test]
fn validation_error_display_variants() {
    assert_eq!(
        ValidationError::InvalidUrl("ftp://x".to_string()).to_string(),
        "Invalid URL: ftp://x"
    );
    assert_eq!(
        ValidationError::EmptyInput("Group name".to_string()).to_string(),
        "Group name cannot be empty"
    );
}

// === DownloadError Tests ===

#[test]
fn download_error_display_variants() {
    assert_eq!(
        DownloadError::InvalidTransition { action: "pause", state: "paused".to_string() }.to_string(),
        "Cannot pause a download that is paused"
    );
    assert_eq!(
        DownloadError::AlreadyFinished("d1".to_string()).to_string(),
        "Download already finished: d1"
    );
    assert_eq!(
        DownloadError::NoRuntime.to_string(),
        "No async runtime available for download polling"
    );
}

// === SyncError / SessionError / TabGroupError Tests ===

#[test]
fn sync_error_display_variants() {
    assert_eq!(SyncError::Empty.to_string(), "Sync snapshot is empty");
    assert_eq!(
        SyncError::Parse("trailing comma".to_string()).to_string(),
        "Sync snapshot parse error: trailing comma"
    );
}

#[test]
fn session_and_group_error_display() {
    assert_eq!(SessionError::NothingToSave.to_string(), "No tabs to save in session");
    assert_eq!(TabGroupError::EmptyName.to_string(), "Tab group name cannot be empty");
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::InvalidKey("general.nope".to_string()).to_string(),
        "Invalid settings key: general.nope"
    );
    assert_eq!(
        SettingsError::IoError("read-only".to_string()).to_string(),
        "Settings I/O error: read-only"
    );
}
