use browsershell::managers::tab_manager::{TabManager, TabManagerTrait};
use browsershell::types::errors::TabError;
use rstest::rstest;

fn open(mgr: &mut TabManager, url: &str) -> String {
    mgr.open_tab(url, false, false, None).unwrap()
}

#[test]
fn test_open_tab_returns_unique_ids_and_activates() {
    let mut mgr = TabManager::new();
    let id1 = open(&mut mgr, "https://a.test");
    let id2 = open(&mut mgr, "https://b.test");

    assert_ne!(id1, id2);
    assert_eq!(mgr.tab_count(), 2);
    assert_eq!(mgr.active_tab().unwrap().id, id2);
}

#[rstest]
#[case(false, false, "New Tab")]
#[case(true, false, "Incognito Tab")]
#[case(false, true, "Pinned Tab")]
fn test_initial_title(#[case] incognito: bool, #[case] pinned: bool, #[case] expected: &str) {
    let mut mgr = TabManager::new();
    let id = mgr.open_tab("https://a.test", incognito, pinned, None).unwrap();
    assert_eq!(mgr.get_tab(&id).unwrap().title, expected);
}

#[rstest]
#[case("about:blank")]
#[case("not a url")]
#[case("file:///etc/passwd")]
fn test_open_tab_rejects_invalid_url(#[case] url: &str) {
    let mut mgr = TabManager::new();
    let err = mgr.open_tab(url, false, false, None).unwrap_err();
    assert!(matches!(err, TabError::InvalidUrl(_)));
    assert_eq!(mgr.tab_count(), 0);
}

#[test]
fn test_close_tab_moves_active_to_neighbour() {
    let mut mgr = TabManager::new();
    let id1 = open(&mut mgr, "https://a.test");
    let id2 = open(&mut mgr, "https://b.test");
    let id3 = open(&mut mgr, "https://c.test");
    mgr.switch_tab(&id2).unwrap();

    let closed = mgr.close_tab(&id2).unwrap();

    assert_eq!(closed.id, id2);
    assert_eq!(mgr.active_tab().unwrap().id, id3);
    assert!(mgr.get_tab(&id1).is_some());
}

#[test]
fn test_close_last_tab_is_refused() {
    let mut mgr = TabManager::new();
    let id = open(&mut mgr, "https://a.test");
    assert!(matches!(mgr.close_tab(&id), Err(TabError::LastTab)));
    assert_eq!(mgr.tab_count(), 1);
}

#[test]
fn test_close_pinned_tab_is_refused() {
    let mut mgr = TabManager::new();
    let pinned = mgr.open_tab("https://a.test", false, true, None).unwrap();
    open(&mut mgr, "https://b.test");

    assert!(matches!(mgr.close_tab(&pinned), Err(TabError::Pinned(_))));
    mgr.toggle_pin(&pinned).unwrap();
    assert!(mgr.close_tab(&pinned).is_ok());
}

#[test]
fn test_toggle_pin_flips_flag() {
    let mut mgr = TabManager::new();
    let id = open(&mut mgr, "https://a.test");
    assert!(mgr.toggle_pin(&id).unwrap());
    assert!(!mgr.toggle_pin(&id).unwrap());
}

#[test]
fn test_update_url_validates() {
    let mut mgr = TabManager::new();
    let id = open(&mut mgr, "https://a.test");

    mgr.update_url(&id, "https://b.test/page").unwrap();
    assert_eq!(mgr.get_tab(&id).unwrap().url, "https://b.test/page");
    assert!(mgr.update_url(&id, "nope").is_err());
    assert!(matches!(
        mgr.update_title("missing", "x"),
        Err(TabError::NotFound(_))
    ));
}

#[test]
fn test_set_group() {
    let mut mgr = TabManager::new();
    let id = open(&mut mgr, "https://a.test");
    mgr.set_group(&id, Some("Work")).unwrap();
    assert_eq!(mgr.get_tab(&id).unwrap().group.as_deref(), Some("Work"));
    mgr.set_group(&id, None).unwrap();
    assert_eq!(mgr.get_tab(&id).unwrap().group, None);
}

#[test]
fn test_enforce_limit_evicts_first_unpinned() {
    let mut mgr = TabManager::new();
    mgr.open_tab("https://pinned.test", false, true, None).unwrap();
    let a = open(&mut mgr, "https://a.test");
    let b = open(&mut mgr, "https://b.test");
    let c = open(&mut mgr, "https://c.test");

    let evicted = mgr.enforce_limit(2);

    let ids: Vec<&str> = evicted.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec![a.as_str(), b.as_str()]);
    assert_eq!(mgr.tab_count(), 2);
    assert_eq!(mgr.active_tab().unwrap().id, c);
}

#[test]
fn test_enforce_limit_zero_is_unlimited() {
    let mut mgr = TabManager::new();
    for host in ["a", "b", "c"] {
        open(&mut mgr, &format!("https://{}.test", host));
    }
    assert!(mgr.enforce_limit(0).is_empty());
    assert_eq!(mgr.tab_count(), 3);
}

#[test]
fn test_enforce_limit_repairs_active_tab() {
    let mut mgr = TabManager::new();
    let a = open(&mut mgr, "https://a.test");
    let b = open(&mut mgr, "https://b.test");
    mgr.switch_tab(&a).unwrap();

    mgr.enforce_limit(1);

    assert_eq!(mgr.active_tab().unwrap().id, b);
}
