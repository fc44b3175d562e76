use serde::{Deserialize, Serialize};

/// Opaque tab identifier, unique within the process.
pub type TabId = String;

/// An open browser tab as the core sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub is_incognito: bool,
    pub is_pinned: bool,
    pub group: Option<String>,
}
