//! Process-wide registry of open windows.
//!
//! The sync engine fans a freshly reconciled snapshot out to every other
//! window through this registry. Windows share no memory: each receives its
//! own copy over a channel and applies it on its own control thread.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::types::sync::{SyncSnapshot, WindowId};

/// Broadcast seam between the sync engine and the open windows.
pub trait WindowRegistry: Send + Sync {
    /// Adds a window and returns the receiving end of its snapshot inbox.
    fn register(&self, window: &str) -> UnboundedReceiver<SyncSnapshot>;
    fn unregister(&self, window: &str);
    /// Sends `snapshot` to every registered window except `origin`.
    /// Returns how many windows were notified.
    fn broadcast(&self, origin: &str, snapshot: &SyncSnapshot) -> usize;
    fn window_ids(&self) -> Vec<WindowId>;
}

/// In-process registry keyed by window id.
#[derive(Default)]
pub struct ProcessWindowRegistry {
    windows: Mutex<BTreeMap<WindowId, UnboundedSender<SyncSnapshot>>>,
}

impl ProcessWindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowRegistry for ProcessWindowRegistry {
    fn register(&self, window: &str) -> UnboundedReceiver<SyncSnapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        windows.insert(window.to_string(), tx);
        debug!(window, open = windows.len(), "window registered");
        rx
    }

    fn unregister(&self, window: &str) {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        windows.remove(window);
        debug!(window, open = windows.len(), "window unregistered");
    }

    fn broadcast(&self, origin: &str, snapshot: &SyncSnapshot) -> usize {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        // Drop windows whose receiver is gone without unregistering.
        windows.retain(|_, tx| !tx.is_closed());
        windows
            .iter()
            .filter(|(id, _)| id.as_str() != origin)
            .filter(|(_, tx)| tx.send(snapshot.clone()).is_ok())
            .count()
    }

    fn window_ids(&self) -> Vec<WindowId> {
        let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        windows.keys().cloned().collect()
    }
}
