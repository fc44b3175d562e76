use serde::{Deserialize, Serialize};

use super::history::HistoryEntry;

/// Unit of cross-window reconciliation, stored whole in the shared sync file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct SyncSnapshot {
    pub bookmarks: Vec<String>,
    pub history: Vec<HistoryEntry>,
    pub home_page: String,
}

/// Identifies one open window inside the process.
pub type WindowId = String;
