//! Bookmark Manager.
//!
//! Implements `BookmarkManagerTrait`: a deduplicated, order-preserving list of
//! URLs backed by a JSON array on disk.

use tracing::{info, warn};

use crate::storage::JsonStore;
use crate::types::errors::BookmarkError;
use crate::url_utils;

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    fn load(&mut self) -> &[String];
    fn save(&self) -> Result<(), BookmarkError>;
    /// Returns `Ok(false)` when the URL was already bookmarked.
    fn add(&mut self, url: &str) -> Result<bool, BookmarkError>;
    fn remove(&mut self, url: &str) -> Result<(), BookmarkError>;
    fn contains(&self, url: &str) -> bool;
    fn list(&self) -> &[String];
    /// Replaces the whole set, e.g. with a freshly reconciled snapshot.
    fn replace_all(&mut self, urls: Vec<String>);
}

/// Bookmark manager backed by a JSON file.
pub struct BookmarkManager {
    store: JsonStore<Vec<String>>,
    bookmarks: Vec<String>,
}

impl BookmarkManager {
    /// Creates an empty manager; call `load` to read the file.
    pub fn new(store: JsonStore<Vec<String>>) -> Self {
        Self {
            store,
            bookmarks: Vec::new(),
        }
    }

    fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(urls.len());
        for url in urls {
            if !out.contains(&url) {
                out.push(url);
            }
        }
        out
    }
}

impl BookmarkManagerTrait for BookmarkManager {
    /// Loads bookmarks from disk. Missing or corrupt files give an empty set.
    fn load(&mut self) -> &[String] {
        let loaded = self.store.load_or_default();
        let count = loaded.len();
        self.bookmarks = Self::dedup_preserving_order(loaded);
        if self.bookmarks.len() != count {
            warn!(
                dropped = count - self.bookmarks.len(),
                "duplicate bookmarks dropped on load"
            );
        }
        &self.bookmarks
    }

    fn save(&self) -> Result<(), BookmarkError> {
        self.store.save(&self.bookmarks)?;
        Ok(())
    }

    fn add(&mut self, url: &str) -> Result<bool, BookmarkError> {
        if !url_utils::is_valid_url(url) {
            return Err(BookmarkError::InvalidUrl(url.to_string()));
        }
        if self.contains(url) {
            return Ok(false);
        }
        self.bookmarks.push(url.to_string());
        self.save()?;
        info!(url, "bookmark added");
        Ok(true)
    }

    fn remove(&mut self, url: &str) -> Result<(), BookmarkError> {
        let idx = self
            .bookmarks
            .iter()
            .position(|b| b == url)
            .ok_or_else(|| BookmarkError::NotFound(url.to_string()))?;
        self.bookmarks.remove(idx);
        self.save()
    }

    fn contains(&self, url: &str) -> bool {
        self.bookmarks.iter().any(|b| b == url)
    }

    fn list(&self) -> &[String] {
        &self.bookmarks
    }

    fn replace_all(&mut self, urls: Vec<String>) {
        self.bookmarks = Self::dedup_preserving_order(urls);
    }
}
