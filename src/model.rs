use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const HEADER_OBJECT: &str = "OBJECT";
pub const HEADER_GROUP: &str = "GROUP";
pub const HEADER_SYNCED: &str = "SYNCED";
pub const HEADER_SYNCED_LAST: &str = "SYNCED LAST";
pub const HEADER_READY: &str = "READY";
pub const HEADER_READY_LAST: &str = "READY LAST";
pub const HEADER_STATUS: &str = "STATUS";

/// Column order of the tree table. The first column is the node key itself,
/// the rest are looked up in `ResourceNode::details`.
pub const TABLE_HEADERS: [&str; 7] = [
    HEADER_OBJECT,
    HEADER_GROUP,
    HEADER_SYNCED,
    HEADER_SYNCED_LAST,
    HEADER_READY,
    HEADER_READY_LAST,
    HEADER_STATUS,
];

pub type Details = BTreeMap<String, String>;

/// Rendering hint attached by the ingestion layer. Never used for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorHint {
    Degraded,
    Paused,
}

/// One node of the resource tree as handed to the UI.
#[derive(Debug, Clone, Default)]
pub struct ResourceNode {
    /// Display identifier, e.g. `XPostgres/db`. Not guaranteed unique.
    pub key: String,
    /// Fully qualified name copied on yank, e.g. `XPostgres.example.org/db`.
    pub value: String,
    pub details: Details,
    pub color: Option<ColorHint>,
    pub detail: Option<Arc<ResourceDetail>>,
    pub children: Vec<ResourceNode>,
}

impl ResourceNode {
    pub fn detail(&self, column: &str) -> &str {
        self.details.get(column).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
impl ResourceNode {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            value: key.clone(),
            key,
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<ResourceNode>) -> Self {
        self.children = children;
        self
    }
}

/// Total node count of a forest, nested children included.
#[cfg(test)]
pub fn count_nodes(forest: &[ResourceNode]) -> usize {
    forest
        .iter()
        .map(|n| 1 + count_nodes(&n.children))
        .sum()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub last_transition_time: Option<String>,
}

impl Condition {
    pub fn is_true(&self) -> bool {
        self.status == "True"
    }

    pub fn is_false(&self) -> bool {
        self.status == "False"
    }
}

/// Everything the detail pane shows for one resource.
#[derive(Debug, Clone, Default)]
pub struct ResourceDetail {
    pub title: String,
    pub side_title: String,
    pub synced: Condition,
    pub ready: Condition,
    pub annotations: BTreeMap<String, String>,
    pub error: Option<String>,
    pub yaml: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_nodes_includes_nested_children() {
        let forest = vec![
            ResourceNode::new("A").with_children(vec![
                ResourceNode::new("B").with_children(vec![ResourceNode::new("B1")]),
                ResourceNode::new("C"),
            ]),
            ResourceNode::new("D"),
        ];
        assert_eq!(count_nodes(&forest), 5);
        assert_eq!(count_nodes(&[]), 0);
    }

    #[test]
    fn missing_detail_column_is_blank() {
        let mut n = ResourceNode::new("A");
        n.details.insert(HEADER_GROUP.into(), "example.org".into());
        assert_eq!(n.detail(HEADER_GROUP), "example.org");
        assert_eq!(n.detail(HEADER_READY), "");
    }
}
