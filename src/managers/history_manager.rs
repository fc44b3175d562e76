//! History Manager.
//!
//! Implements `HistoryManagerTrait`: an append-only log of visits, stored in
//! full and displayed most-recent-first.

use chrono::{DateTime, Utc};

use crate::storage::JsonStore;
use crate::types::errors::HistoryError;
use crate::types::history::HistoryEntry;

/// Number of entries shown in the history menu.
pub const HISTORY_MENU_LIMIT: usize = 20;

/// Trait defining history management operations.
pub trait HistoryManagerTrait {
    fn load(&mut self) -> usize;
    fn save(&self) -> Result<(), HistoryError>;
    fn record_visit(&mut self, url: &str, title: &str, at: DateTime<Utc>) -> Result<(), HistoryError>;
    /// The `limit` most recent entries, newest first.
    fn recent(&self, limit: usize) -> Vec<&HistoryEntry>;
    fn entries(&self) -> &[HistoryEntry];
    fn replace_all(&mut self, entries: Vec<HistoryEntry>);
    fn clear_all(&mut self) -> Result<(), HistoryError>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// History manager backed by a JSON file.
pub struct HistoryManager {
    store: JsonStore<Vec<HistoryEntry>>,
    entries: Vec<HistoryEntry>,
}

impl HistoryManager {
    pub fn new(store: JsonStore<Vec<HistoryEntry>>) -> Self {
        Self {
            store,
            entries: Vec::new(),
        }
    }
}

impl HistoryManagerTrait for HistoryManager {
    fn load(&mut self) -> usize {
        self.entries = self.store.load_or_default();
        self.entries.len()
    }

    fn save(&self) -> Result<(), HistoryError> {
        self.store.save(&self.entries)?;
        Ok(())
    }

    /// Appends a visit and persists the log.
    fn record_visit(&mut self, url: &str, title: &str, at: DateTime<Utc>) -> Result<(), HistoryError> {
        self.entries.push(HistoryEntry {
            url: url.to_string(),
            title: title.to_string(),
            time: at,
        });
        self.save()
    }

    fn recent(&self, limit: usize) -> Vec<&HistoryEntry> {
        // Reverse first so that equal timestamps list the later append first;
        // sort_by is stable.
        let mut out: Vec<&HistoryEntry> = self.entries.iter().rev().collect();
        out.sort_by(|a, b| b.time.cmp(&a.time));
        out.truncate(limit);
        out
    }

    fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    fn replace_all(&mut self, entries: Vec<HistoryEntry>) {
        self.entries = entries;
    }

    fn clear_all(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        self.save()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
