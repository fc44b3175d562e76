use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Opaque download identifier.
pub type DownloadId = String;

/// Lifecycle of a download as tracked by its controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadState {
    Pending,
    Active,
    Paused,
    Completed,
    Interrupted,
    Cancelled,
}

impl DownloadState {
    /// Terminal states admit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DownloadState::Completed | DownloadState::Interrupted | DownloadState::Cancelled
        )
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DownloadState::Pending => "pending",
            DownloadState::Active => "active",
            DownloadState::Paused => "paused",
            DownloadState::Completed => "completed",
            DownloadState::Interrupted => "interrupted",
            DownloadState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// State reported by the engine's download operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OperationState {
    InProgress,
    Paused,
    Completed,
    Interrupted,
}

/// One poll of the engine's download counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSnapshot {
    pub bytes_received: u64,
    pub total_bytes: Option<u64>,
    pub state: OperationState,
}

/// Handle to a download running inside the embedded engine.
///
/// The only signal the engine offers is a pollable counter, so controllers
/// call `snapshot` on a fixed interval. Control requests are fire-and-forget;
/// their effect shows up in a later snapshot.
pub trait DownloadOperation: Send + Sync {
    fn snapshot(&self) -> OperationSnapshot;
    fn pause(&self);
    fn resume(&self);
    fn cancel(&self);
}

/// Read-only view of a download for listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DownloadItem {
    pub id: DownloadId,
    pub save_path: PathBuf,
    pub state: DownloadState,
    pub bytes_received: u64,
    pub total_bytes: Option<u64>,
    /// `None` while the total size is unknown.
    pub percentage: Option<f64>,
}

/// Events emitted by controllers; consumed on the window's control thread.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    StateChanged {
        id: DownloadId,
        state: DownloadState,
    },
    Progress {
        id: DownloadId,
        bytes_received: u64,
        total_bytes: Option<u64>,
        percentage: Option<f64>,
    },
    /// One-shot notification on completion or interruption.
    Finished {
        id: DownloadId,
        state: DownloadState,
        file_name: String,
    },
    /// The grace period elapsed; the progress indicator can be hidden.
    Dismiss { id: DownloadId },
}

impl DownloadEvent {
    pub fn id(&self) -> &str {
        match self {
            DownloadEvent::StateChanged { id, .. }
            | DownloadEvent::Progress { id, .. }
            | DownloadEvent::Finished { id, .. }
            | DownloadEvent::Dismiss { id } => id,
        }
    }
}
