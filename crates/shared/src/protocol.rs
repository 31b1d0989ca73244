use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Paging metadata returned alongside every `find` listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub found_count: u64,
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub documents: Vec<T>,
    #[serde(flatten)]
    pub info: PageInfo,
}

/// Query parameters shared by the `find` endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindQuery {
    #[serde(rename = "find", default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl FindQuery {
    pub fn new(term: impl Into<String>, page: Option<u32>) -> Self {
        let term = term.into();
        Self {
            term: (!term.is_empty()).then_some(term),
            page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushInterface {
    Analyses,
    References,
    Subtraction,
    Files,
    Users,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushOperation {
    Insert,
    Update,
    Remove,
    #[serde(other)]
    Other,
}

/// Server-initiated change notification delivered over the websocket.
///
/// `data` is a full document for `insert`/`update` and a list of ids for
/// `remove`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub interface: PushInterface,
    pub operation: PushOperation,
    #[serde(default)]
    pub data: Value,
}
