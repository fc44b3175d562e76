//! Cross-window Sync Engine.
//!
//! Every open window publishes its bookmarks, history and homepage to one
//! shared sync file after each local mutation, then re-reads that file and
//! adopts it wholesale. The fresh snapshot is pushed to all other windows
//! through the [`WindowRegistry`].
//!
//! The file is overwritten in full (last writer wins) and the write-then-read
//! pair is not atomic. Windows inside one process converge because every
//! mutation is echoed to all of them; windows in different processes can race
//! and only converge eventually. Mutations another window made since this
//! window's last reconcile are overwritten by this window's next publish.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::services::window_registry::WindowRegistry;
use crate::types::errors::SyncError;
use crate::types::history::HistoryEntry;
use crate::types::sync::{SyncSnapshot, WindowId};

/// The shared file as read back. Absent or `null` fields keep the local value.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SharedSnapshot {
    #[serde(default)]
    pub bookmarks: Option<Vec<String>>,
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
    #[serde(default)]
    pub home_page: Option<String>,
}

impl SharedSnapshot {
    /// Builds the snapshot `local` becomes after adopting this one.
    pub fn merged_into(self, local: &SyncSnapshot) -> SyncSnapshot {
        SyncSnapshot {
            bookmarks: self.bookmarks.unwrap_or_else(|| local.bookmarks.clone()),
            history: self.history.unwrap_or_else(|| local.history.clone()),
            home_page: self.home_page.unwrap_or_else(|| local.home_page.clone()),
        }
    }
}

/// Trait defining the sync engine interface.
pub trait SyncEngineTrait {
    /// Overwrites the shared file with `local`.
    fn publish(&self, local: &SyncSnapshot) -> Result<(), SyncError>;
    /// Re-reads the shared file, replaces `local` with it and notifies the
    /// other windows. On any failure `local` is left untouched.
    fn reconcile(&self, local: &mut SyncSnapshot) -> Result<(), SyncError>;
    /// `publish` followed by `reconcile`; failures are logged, never returned.
    fn sync(&self, local: &mut SyncSnapshot) -> bool;
    fn read_shared(&self) -> Result<SharedSnapshot, SyncError>;
}

pub struct SyncEngine {
    path: PathBuf,
    window_id: WindowId,
    registry: Arc<dyn WindowRegistry>,
}

impl SyncEngine {
    pub fn new<P: Into<PathBuf>>(path: P, window_id: &str, registry: Arc<dyn WindowRegistry>) -> Self {
        Self {
            path: path.into(),
            window_id: window_id.to_string(),
            registry,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn window_id(&self) -> &str {
        &self.window_id
    }
}

impl SyncEngineTrait for SyncEngine {
    fn publish(&self, local: &SyncSnapshot) -> Result<(), SyncError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SyncError::Io(e.to_string()))?;
            }
        }
        let json = serde_json::to_string_pretty(local).map_err(|e| SyncError::Parse(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| SyncError::Io(e.to_string()))?;
        debug!(window = %self.window_id, bookmarks = local.bookmarks.len(), "snapshot published");
        Ok(())
    }

    fn reconcile(&self, local: &mut SyncSnapshot) -> Result<(), SyncError> {
        let fresh = self.read_shared()?.merged_into(local);
        *local = fresh;
        let notified = self.registry.broadcast(&self.window_id, local);
        debug!(window = %self.window_id, notified, "snapshot reconciled");
        Ok(())
    }

    fn sync(&self, local: &mut SyncSnapshot) -> bool {
        if let Err(e) = self.publish(local) {
            error!(window = %self.window_id, error = %e, "error publishing sync snapshot");
            return false;
        }
        match self.reconcile(local) {
            Ok(()) => true,
            Err(e) => {
                warn!(window = %self.window_id, error = %e, "sync reconcile failed; keeping local state");
                false
            }
        }
    }

    fn read_shared(&self) -> Result<SharedSnapshot, SyncError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SyncError::Io(format!("{} does not exist", self.path.display())))
            }
            Err(e) => return Err(SyncError::Io(e.to_string())),
        };
        let parsed: Option<SharedSnapshot> =
            serde_json::from_str(&content).map_err(|e| SyncError::Parse(e.to_string()))?;
        parsed.ok_or(SyncError::Empty)
    }
}
