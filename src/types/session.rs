use serde::{Deserialize, Serialize};

/// A tab's state as stored in the session file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SessionEntry {
    pub url: String,
    #[serde(default)]
    pub is_incognito: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub group_name: Option<String>,
}

/// A tab to recreate on restore.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredTab {
    pub url: String,
    pub is_pinned: bool,
    pub group: Option<String>,
}
