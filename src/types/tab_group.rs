use serde::{Deserialize, Serialize};

/// A named set of member URLs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TabGroup {
    pub name: String,
    pub urls: Vec<String>,
}
