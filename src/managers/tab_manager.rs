use tracing::{debug, info};
use uuid::Uuid;

use crate::types::errors::TabError;
use crate::types::tab::{Tab, TabId};
use crate::url_utils;

/// Evicts unpinned tabs, first in display order, until `tabs.len() <= limit`.
///
/// Stops early when only pinned tabs remain, so the limit may stay exceeded.
/// Returns the evicted tabs in eviction order.
pub fn enforce_limit(tabs: &mut Vec<Tab>, limit: usize) -> Vec<Tab> {
    let mut evicted = Vec::new();
    while tabs.len() > limit {
        match tabs.iter().position(|t| !t.is_pinned) {
            Some(idx) => evicted.push(tabs.remove(idx)),
            None => {
                debug!(count = tabs.len(), limit, "tab limit exceeded by pinned tabs only");
                break;
            }
        }
    }
    evicted
}

/// Trait defining the tab management interface.
pub trait TabManagerTrait {
    fn open_tab(
        &mut self,
        url: &str,
        is_incognito: bool,
        is_pinned: bool,
        group: Option<&str>,
    ) -> Result<TabId, TabError>;
    fn close_tab(&mut self, tab_id: &str) -> Result<Tab, TabError>;
    fn switch_tab(&mut self, tab_id: &str) -> Result<(), TabError>;
    /// Returns the new pinned flag.
    fn toggle_pin(&mut self, tab_id: &str) -> Result<bool, TabError>;
    fn set_group(&mut self, tab_id: &str, group: Option<&str>) -> Result<(), TabError>;
    fn update_url(&mut self, tab_id: &str, url: &str) -> Result<(), TabError>;
    fn update_title(&mut self, tab_id: &str, title: &str) -> Result<(), TabError>;
    /// `limit == 0` disables the limit.
    fn enforce_limit(&mut self, limit: usize) -> Vec<Tab>;
    fn get_tab(&self, tab_id: &str) -> Option<&Tab>;
    fn active_tab(&self) -> Option<&Tab>;
    fn tabs(&self) -> &[Tab];
    fn tab_count(&self) -> usize;
}

/// In-memory tab list of one window, kept in display order.
pub struct TabManager {
    tabs: Vec<Tab>,
    active_tab_id: Option<TabId>,
}

impl TabManager {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
        }
    }

    fn find_tab_index(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    fn tab_mut(&mut self, tab_id: &str) -> Result<&mut Tab, TabError> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))
    }

    /// Keeps the active tab valid after removals.
    fn repair_active(&mut self, removed_at: usize) {
        let still_there = self
            .active_tab_id
            .as_deref()
            .is_some_and(|id| self.tabs.iter().any(|t| t.id == id));
        if still_there {
            return;
        }
        self.active_tab_id = if self.tabs.is_empty() {
            None
        } else {
            let idx = removed_at.min(self.tabs.len() - 1);
            Some(self.tabs[idx].id.clone())
        };
    }
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TabManagerTrait for TabManager {
    /// Appends a tab and makes it active. The URL must be an absolute http(s) URL.
    fn open_tab(
        &mut self,
        url: &str,
        is_incognito: bool,
        is_pinned: bool,
        group: Option<&str>,
    ) -> Result<TabId, TabError> {
        if !url_utils::is_valid_url(url) {
            return Err(TabError::InvalidUrl(url.to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let title = if is_incognito {
            "Incognito Tab"
        } else if is_pinned {
            "Pinned Tab"
        } else {
            "New Tab"
        };
        self.tabs.push(Tab {
            id: id.clone(),
            url: url.to_string(),
            title: title.to_string(),
            is_incognito,
            is_pinned,
            group: group.filter(|g| !g.is_empty()).map(str::to_string),
        });
        self.active_tab_id = Some(id.clone());
        Ok(id)
    }

    /// Closes a tab. The last tab and pinned tabs stay open.
    fn close_tab(&mut self, tab_id: &str) -> Result<Tab, TabError> {
        let idx = self
            .find_tab_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        if self.tabs.len() == 1 {
            return Err(TabError::LastTab);
        }
        if self.tabs[idx].is_pinned {
            return Err(TabError::Pinned(tab_id.to_string()));
        }

        let removed = self.tabs.remove(idx);
        self.repair_active(idx);
        Ok(removed)
    }

    fn switch_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        if self.find_tab_index(tab_id).is_none() {
            return Err(TabError::NotFound(tab_id.to_string()));
        }
        self.active_tab_id = Some(tab_id.to_string());
        Ok(())
    }

    fn toggle_pin(&mut self, tab_id: &str) -> Result<bool, TabError> {
        let tab = self.tab_mut(tab_id)?;
        tab.is_pinned = !tab.is_pinned;
        Ok(tab.is_pinned)
    }

    fn set_group(&mut self, tab_id: &str, group: Option<&str>) -> Result<(), TabError> {
        let tab = self.tab_mut(tab_id)?;
        tab.group = group.map(str::to_string);
        Ok(())
    }

    fn update_url(&mut self, tab_id: &str, url: &str) -> Result<(), TabError> {
        if !url_utils::is_valid_url(url) {
            return Err(TabError::InvalidUrl(url.to_string()));
        }
        let tab = self.tab_mut(tab_id)?;
        tab.url = url.to_string();
        Ok(())
    }

    fn update_title(&mut self, tab_id: &str, title: &str) -> Result<(), TabError> {
        let tab = self.tab_mut(tab_id)?;
        tab.title = title.to_string();
        Ok(())
    }

    fn enforce_limit(&mut self, limit: usize) -> Vec<Tab> {
        if limit == 0 {
            return Vec::new();
        }
        let first_evicted_at = self.tabs.iter().position(|t| !t.is_pinned).unwrap_or(0);
        let evicted = enforce_limit(&mut self.tabs, limit);
        if !evicted.is_empty() {
            info!(evicted = evicted.len(), limit, "tabs closed to honour tab limit");
            self.repair_active(first_evicted_at);
        }
        evicted
    }

    fn get_tab(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id
            .as_ref()
            .and_then(|id| self.tabs.iter().find(|t| t.id == *id))
    }

    fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}
