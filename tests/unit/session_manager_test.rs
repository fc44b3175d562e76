use browsershell::managers::session_manager::{SessionManager, SessionManagerTrait};
use browsershell::managers::tab_group_manager::{TabGroupManager, TabGroupManagerTrait};
use browsershell::storage::JsonStore;
use browsershell::types::errors::SessionError;
use browsershell::types::session::RestoredTab;
use browsershell::types::tab::Tab;
use tempfile::TempDir;

const HOME: &str = "https://home.test";

fn manager(dir: &TempDir) -> SessionManager {
    SessionManager::new(JsonStore::new(dir.path().join("session.json")))
}

fn tab(url: &str, incognito: bool, pinned: bool, group: Option<&str>) -> Tab {
    Tab {
        id: url.to_string(),
        url: url.to_string(),
        title: String::new(),
        is_incognito: incognito,
        is_pinned: pinned,
        group: group.map(str::to_string),
    }
}

fn home_only() -> Vec<RestoredTab> {
    vec![RestoredTab {
        url: HOME.to_string(),
        is_pinned: false,
        group: None,
    }]
}

#[test]
fn test_missing_session_restores_single_home_tab() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir);

    assert!(!mgr.has_session());
    assert_eq!(mgr.restore(HOME), home_only());
}

#[test]
fn test_corrupt_session_restores_single_home_tab() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("session.json"), "[{\"Url\": ").unwrap();
    let mgr = manager(&dir);

    assert_eq!(mgr.restore(HOME), home_only());
}

#[test]
fn test_save_skips_incognito_and_keeps_flags() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir);
    let groups = TabGroupManager::in_memory();
    let tabs = vec![
        tab("https://a.test", false, true, Some("Work")),
        tab("https://secret.test", true, false, None),
        tab("https://b.test", false, false, None),
    ];

    assert_eq!(mgr.save(&tabs, &groups).unwrap(), 2);

    let restored = mgr.restore(HOME);
    assert_eq!(
        restored,
        vec![
            RestoredTab {
                url: "https://a.test".to_string(),
                is_pinned: true,
                group: Some("Work".to_string()),
            },
            RestoredTab {
                url: "https://b.test".to_string(),
                is_pinned: false,
                group: None,
            },
        ]
    );
}

#[test]
fn test_save_resolves_group_from_registry() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir);
    let mut groups = TabGroupManager::in_memory();
    groups.add_to_group("Reading", "https://a.test").unwrap();

    mgr.save(&[tab("https://a.test", false, false, None)], &groups)
        .unwrap();

    assert_eq!(mgr.restore(HOME)[0].group.as_deref(), Some("Reading"));
}

#[test]
fn test_save_without_tabs_keeps_previous_session() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir);
    let groups = TabGroupManager::in_memory();
    mgr.save(&[tab("https://a.test", false, false, None)], &groups)
        .unwrap();

    let err = mgr.save(&[], &groups).unwrap_err();

    assert!(matches!(err, SessionError::NothingToSave));
    assert_eq!(mgr.restore(HOME)[0].url, "https://a.test");
}

#[test]
fn test_session_file_format() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir);
    mgr.save(
        &[tab("https://a.test", false, true, Some("Work"))],
        &TabGroupManager::in_memory(),
    )
    .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{
            "Url": "https://a.test",
            "IsIncognito": false,
            "IsPinned": true,
            "GroupName": "Work"
        }])
    );
}

#[test]
fn test_restore_skips_incognito_and_invalid_entries() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("session.json"),
        r#"[
            {"Url": "https://secret.test", "IsIncognito": true, "IsPinned": false, "GroupName": null},
            {"Url": "not a url", "IsIncognito": false, "IsPinned": false, "GroupName": null},
            {"Url": "https://ok.test", "IsIncognito": false, "IsPinned": false, "GroupName": ""}
        ]"#,
    )
    .unwrap();
    let mgr = manager(&dir);

    let restored = mgr.restore(HOME);
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].url, "https://ok.test");
    assert_eq!(restored[0].group, None);
}

#[test]
fn test_all_incognito_tabs_keep_previous_session() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir);
    let groups = TabGroupManager::in_memory();
    mgr.save(&[tab("https://a.test", false, true, None)], &groups)
        .unwrap();

    let err = mgr
        .save(&[tab("https://secret.test", true, false, None)], &groups)
        .unwrap_err();

    assert!(matches!(err, SessionError::NothingToSave));
    let raw = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
    assert!(!raw.contains("secret.test"));
    assert_eq!(mgr.restore(HOME)[0].url, "https://a.test");
}

#[test]
fn test_all_incognito_without_previous_session_restores_home() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir);

    assert!(mgr
        .save(&[tab("https://secret.test", true, false, None)], &TabGroupManager::in_memory())
        .is_err());

    assert!(!mgr.has_session());
    assert_eq!(mgr.restore(HOME), home_only());
}
