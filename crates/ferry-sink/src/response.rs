use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Body returned by the `_bulk` endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: u64,
    /// True when at least one item failed
    #[serde(default)]
    pub errors: bool,
    /// One entry per request, keyed by action name
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkResponseItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkResponseItem {
    #[serde(default, rename = "_index")]
    pub index: String,
    #[serde(default, rename = "_type")]
    pub type_name: String,
    #[serde(default, rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl BulkResponseItem {
    pub fn is_failure(&self) -> bool {
        self.status > 299 || self.error.is_some()
    }
}

impl BulkResponse {
    /// Response for a batch of `count` requests that all succeeded
    pub fn succeeded(count: usize) -> Self {
        Self {
            took: 0,
            errors: false,
            items: (0..count).map(|_| HashMap::new()).collect(),
        }
    }

    /// Items that were rejected by the store
    pub fn failed(&self) -> Vec<&BulkResponseItem> {
        self.items
            .iter()
            .flat_map(|item| item.values())
            .filter(|item| item.is_failure())
            .collect()
    }
}
