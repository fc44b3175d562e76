use std::path::{Path, PathBuf};

use crate::platform;

/// Resolves the per-profile JSON files inside one data directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StorePaths {
    data_dir: PathBuf,
}

impl StorePaths {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Uses the platform data directory.
    pub fn platform_default() -> Self {
        Self::new(platform::get_data_dir())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn bookmarks(&self) -> PathBuf {
        self.data_dir.join("bookmarks.json")
    }

    pub fn history(&self) -> PathBuf {
        self.data_dir.join("history.json")
    }

    pub fn tab_groups(&self) -> PathBuf {
        self.data_dir.join("tab_groups.json")
    }

    pub fn session(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    pub fn settings(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    /// Shared by every window of every process using this data directory.
    pub fn sync(&self) -> PathBuf {
        self.data_dir.join("cloud_sync.json")
    }
}
