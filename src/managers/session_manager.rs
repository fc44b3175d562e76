//! Session Manager.
//!
//! Saves the open, non-incognito tabs of a window (url, pinned flag, group)
//! to the session file and turns that file back into tabs on startup.

use tracing::{error, info, warn};

use crate::managers::tab_group_manager::TabGroupManagerTrait;
use crate::storage::JsonStore;
use crate::types::errors::SessionError;
use crate::types::session::{RestoredTab, SessionEntry};
use crate::types::tab::Tab;
use crate::url_utils;

/// Trait defining session management operations.
pub trait SessionManagerTrait {
    /// Persists `tabs`, dropping incognito ones. Returns the number written.
    fn save(&self, tabs: &[Tab], groups: &dyn TabGroupManagerTrait) -> Result<usize, SessionError>;
    /// Never fails: missing or unreadable sessions yield one homepage tab.
    fn restore(&self, home_page: &str) -> Vec<RestoredTab>;
    fn has_session(&self) -> bool;
}

/// Session manager backed by a JSON file.
pub struct SessionManager {
    store: JsonStore<Vec<SessionEntry>>,
}

impl SessionManager {
    pub fn new(store: JsonStore<Vec<SessionEntry>>) -> Self {
        Self { store }
    }

    fn default_tabs(home_page: &str) -> Vec<RestoredTab> {
        vec![RestoredTab {
            url: home_page.to_string(),
            is_pinned: false,
            group: None,
        }]
    }
}

impl SessionManagerTrait for SessionManager {
    fn save(&self, tabs: &[Tab], groups: &dyn TabGroupManagerTrait) -> Result<usize, SessionError> {
        let entries: Vec<SessionEntry> = tabs
            .iter()
            .filter(|t| !t.is_incognito)
            .map(|t| SessionEntry {
                url: t.url.clone(),
                is_incognito: false,
                is_pinned: t.is_pinned,
                group_name: t
                    .group
                    .clone()
                    .or_else(|| groups.group_of(&t.url).map(str::to_string)),
            })
            .collect();

        // Never replace a stored session with an empty one.
        if entries.is_empty() {
            warn!(incognito = tabs.len(), "no regular tabs to save in session; keeping previous session");
            return Err(SessionError::NothingToSave);
        }

        self.store.save(&entries)?;
        info!(saved = entries.len(), skipped = tabs.len() - entries.len(), "session saved");
        Ok(entries.len())
    }

    fn restore(&self, home_page: &str) -> Vec<RestoredTab> {
        let entries = match self.store.load() {
            Ok(Some(entries)) => entries,
            Ok(None) => return Self::default_tabs(home_page),
            Err(e) => {
                error!(error = %e, "error restoring session");
                return Self::default_tabs(home_page);
            }
        };

        let restored: Vec<RestoredTab> = entries
            .into_iter()
            .filter(|e| {
                if e.is_incognito {
                    warn!(url = %e.url, "skipping incognito tab found in session file");
                    return false;
                }
                if !url_utils::is_valid_url(&e.url) {
                    warn!(url = %e.url, "skipping session tab with invalid url");
                    return false;
                }
                true
            })
            .map(|e| RestoredTab {
                url: e.url,
                is_pinned: e.is_pinned,
                group: e.group_name.filter(|g| !g.is_empty()),
            })
            .collect();

        if restored.is_empty() {
            return Self::default_tabs(home_page);
        }
        restored
    }

    fn has_session(&self) -> bool {
        self.store.exists()
    }
}
