use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single visit. Field names match the on-disk `{Url, Title, Time}` shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    pub time: DateTime<Utc>,
}
