//! Tab Group Manager.
//!
//! Maps group names to member URLs. A URL may sit in any number of groups;
//! groups keep their insertion order so lookups are deterministic.

use crate::storage::JsonStore;
use crate::types::errors::TabGroupError;
use crate::types::tab_group::TabGroup;

/// Trait defining tab group operations.
pub trait TabGroupManagerTrait {
    fn load(&mut self) -> usize;
    fn save(&self) -> Result<(), TabGroupError>;
    /// Creates the group if absent and appends `url` unless already a member.
    fn add_to_group(&mut self, name: &str, url: &str) -> Result<(), TabGroupError>;
    fn remove_from_group(&mut self, name: &str, url: &str) -> Result<(), TabGroupError>;
    fn remove_group(&mut self, name: &str) -> Result<(), TabGroupError>;
    /// First group, in insertion order, that contains `url`.
    fn group_of(&self, url: &str) -> Option<&str>;
    fn members(&self, name: &str) -> Option<&[String]>;
    fn groups(&self) -> &[TabGroup];
}

pub struct TabGroupManager {
    store: Option<JsonStore<Vec<TabGroup>>>,
    groups: Vec<TabGroup>,
}

impl TabGroupManager {
    /// Groups persisted to `store` on every mutation.
    pub fn new(store: JsonStore<Vec<TabGroup>>) -> Self {
        Self {
            store: Some(store),
            groups: Vec::new(),
        }
    }

    /// Groups that live only as long as the window.
    pub fn in_memory() -> Self {
        Self {
            store: None,
            groups: Vec::new(),
        }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }
}

impl Default for TabGroupManager {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl TabGroupManagerTrait for TabGroupManager {
    fn load(&mut self) -> usize {
        if let Some(store) = &self.store {
            self.groups = store.load_or_default();
        }
        self.groups.len()
    }

    fn save(&self) -> Result<(), TabGroupError> {
        match &self.store {
            Some(store) => Ok(store.save(&self.groups)?),
            None => Ok(()),
        }
    }

    fn add_to_group(&mut self, name: &str, url: &str) -> Result<(), TabGroupError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TabGroupError::EmptyName);
        }

        let idx = match self.find(name) {
            Some(idx) => idx,
            None => {
                self.groups.push(TabGroup {
                    name: name.to_string(),
                    urls: Vec::new(),
                });
                self.groups.len() - 1
            }
        };

        let group = &mut self.groups[idx];
        if !group.urls.iter().any(|u| u == url) {
            group.urls.push(url.to_string());
        }
        self.save()
    }

    fn remove_from_group(&mut self, name: &str, url: &str) -> Result<(), TabGroupError> {
        let idx = self
            .find(name)
            .ok_or_else(|| TabGroupError::NotFound(name.to_string()))?;
        self.groups[idx].urls.retain(|u| u != url);
        self.save()
    }

    fn remove_group(&mut self, name: &str) -> Result<(), TabGroupError> {
        let idx = self
            .find(name)
            .ok_or_else(|| TabGroupError::NotFound(name.to_string()))?;
        self.groups.remove(idx);
        self.save()
    }

    fn group_of(&self, url: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.urls.iter().any(|u| u == url))
            .map(|g| g.name.as_str())
    }

    fn members(&self, name: &str) -> Option<&[String]> {
        self.find(name).map(|idx| self.groups[idx].urls.as_slice())
    }

    fn groups(&self) -> &[TabGroup] {
        &self.groups
    }
}
