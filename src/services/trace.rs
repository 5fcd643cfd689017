//! Crossplane trace payload (`crossplane beta trace -o json`) and its mapping
//! onto the UI's `ResourceNode` tree.

use crate::model::{
    ColorHint, Condition, ResourceDetail, ResourceNode, HEADER_GROUP, HEADER_READY,
    HEADER_READY_LAST, HEADER_STATUS, HEADER_SYNCED, HEADER_SYNCED_LAST,
};
use crate::services::loader::get_by_path;
use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const CONDITION_SYNCED: &str = "Synced";
pub const CONDITION_READY: &str = "Ready";
pub const ANNOTATION_PAUSED: &str = "crossplane.io/paused";
pub const DATE_FORMAT: &str = "%d %b %y %H:%M";
const STATUS_MAX_CHARS: usize = 96;

/// One traced resource with its composed children.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub object: JsonValue,
    #[serde(default)]
    pub error: Option<JsonValue>,
    #[serde(default)]
    pub children: Vec<Resource>,
}

impl Resource {
    fn str_at(&self, path: &str) -> &str {
        get_by_path(&self.object, path)
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    pub fn kind(&self) -> &str {
        self.str_at("kind")
    }

    pub fn name(&self) -> &str {
        self.str_at("metadata.name")
    }

    pub fn api_version(&self) -> &str {
        self.str_at("apiVersion")
    }

    /// API group of `apiVersion`; empty for the core group (`v1`).
    pub fn group(&self) -> &str {
        match self.api_version().rsplit_once('/') {
            Some((group, _)) => group,
            None => "",
        }
    }

    pub fn annotations(&self) -> BTreeMap<String, String> {
        get_by_path(&self.object, "metadata.annotations")
            .and_then(|v| v.as_object())
            .map(|m| {
                m.iter()
                    .map(|(k, v)| {
                        let v = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                        (k.clone(), v)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_deleting(&self) -> bool {
        get_by_path(&self.object, "metadata.deletionTimestamp")
            .map(|v| !v.is_null())
            .unwrap_or(false)
    }

    /// Condition of the given type, or an empty condition when absent.
    pub fn condition(&self, kind: &str) -> Condition {
        get_by_path(&self.object, "status.conditions")
            .and_then(|v| v.as_array())
            .and_then(|conds| {
                conds
                    .iter()
                    .filter_map(|c| serde_json::from_value::<Condition>(c.clone()).ok())
                    .find(|c| c.kind == kind)
            })
            .unwrap_or_default()
    }

    pub fn error_message(&self) -> Option<String> {
        let err = self.error.as_ref()?;
        if err.is_null() {
            return None;
        }
        let msg = err
            .get("message")
            .or_else(|| get_by_path(err, "ErrStatus.message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        Some(msg)
    }
}

/// One-line status summary, prioritising deletion, errors, then sync issues
/// over readiness issues.
pub fn status_text(r: &Resource) -> String {
    let ready = r.condition(CONDITION_READY);
    let synced = r.condition(CONDITION_SYNCED);
    let has_text = |c: &Condition| !c.reason.is_empty() || !c.message.is_empty();

    let (status, msg) = if r.is_deleting() {
        ("Deleting".to_string(), String::new())
    } else if let Some(err) = r.error_message() {
        ("Error".to_string(), err)
    } else if ready.is_true() && synced.is_true() {
        (ready.reason.clone(), String::new())
    } else if !synced.is_true() && has_text(&synced) {
        (synced.reason.clone(), synced.message.clone())
    } else {
        (ready.reason.clone(), ready.message.clone())
    };

    if msg.is_empty() {
        status
    } else {
        format!("{status}: {msg}")
    }
}

pub fn format_transition(c: &Condition) -> String {
    c.last_transition_time
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Local).format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn to_node(r: &Resource) -> ResourceNode {
    let kind = r.kind();
    let name = r.name();
    let group = r.group();
    let ready = r.condition(CONDITION_READY);
    let synced = r.condition(CONDITION_SYNCED);
    let annotations = r.annotations();

    let mut key = format!("{kind}/{name}");
    let value = if group.is_empty() {
        key.clone()
    } else {
        format!("{kind}.{group}/{name}")
    };

    let mut color = None;
    if annotations.get(ANNOTATION_PAUSED).map(String::as_str) == Some("true") {
        key.push_str(" (paused)");
        color = Some(ColorHint::Paused);
    }
    if synced.is_false() || ready.is_false() || r.error_message().is_some() {
        color = Some(ColorHint::Degraded);
    }

    let mut details = BTreeMap::new();
    details.insert(HEADER_GROUP.to_string(), group.to_string());
    details.insert(HEADER_SYNCED.to_string(), synced.status.clone());
    details.insert(HEADER_SYNCED_LAST.to_string(), format_transition(&synced));
    details.insert(HEADER_READY.to_string(), ready.status.clone());
    details.insert(HEADER_READY_LAST.to_string(), format_transition(&ready));
    details.insert(
        HEADER_STATUS.to_string(),
        ellipsize(&status_text(r), STATUS_MAX_CHARS),
    );

    let yaml = serde_yaml::to_string(&r.object).unwrap_or_else(|e| format!("# {e}"));
    let detail = ResourceDetail {
        title: format!("{kind}/{name}"),
        side_title: r.api_version().to_string(),
        synced,
        ready,
        annotations,
        error: r.error_message(),
        yaml,
    };

    ResourceNode {
        key,
        value,
        details,
        color,
        detail: Some(Arc::new(detail)),
        children: r.children.iter().map(to_node).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(v: JsonValue) -> Resource {
        serde_json::from_value(v).unwrap()
    }

    fn cond(kind: &str, status: &str, reason: &str, message: &str) -> JsonValue {
        json!({
            "type": kind,
            "status": status,
            "reason": reason,
            "message": message,
            "lastTransitionTime": "2024-03-01T10:20:00Z"
        })
    }

    #[test]
    fn healthy_resource_maps_to_plain_node() {
        let r = resource(json!({
            "object": {
                "apiVersion": "example.org/v1alpha1",
                "kind": "XPostgres",
                "metadata": {"name": "db"},
                "status": {"conditions": [
                    cond("Synced", "True", "ReconcileSuccess", ""),
                    cond("Ready", "True", "Available", "")
                ]}
            }
        }));
        let node = to_node(&r);
        assert_eq!(node.key, "XPostgres/db");
        assert_eq!(node.value, "XPostgres.example.org/db");
        assert_eq!(node.detail(HEADER_GROUP), "example.org");
        assert_eq!(node.detail(HEADER_READY), "True");
        assert_eq!(node.detail(HEADER_STATUS), "Available");
        assert!(!node.detail(HEADER_READY_LAST).is_empty());
        assert!(node.color.is_none());
        let detail = node.detail.unwrap();
        assert_eq!(detail.title, "XPostgres/db");
        assert_eq!(detail.side_title, "example.org/v1alpha1");
        assert!(detail.yaml.contains("kind: XPostgres"));
    }

    #[test]
    fn sync_failure_takes_priority_and_marks_degraded() {
        let r = resource(json!({
            "object": {
                "apiVersion": "v1",
                "kind": "Secret",
                "metadata": {"name": "creds"},
                "status": {"conditions": [
                    cond("Synced", "False", "ReconcileError", "boom"),
                    cond("Ready", "False", "Unavailable", "waiting")
                ]}
            }
        }));
        assert_eq!(status_text(&r), "ReconcileError: boom");
        let node = to_node(&r);
        assert_eq!(node.value, "Secret/creds");
        assert_eq!(node.color, Some(ColorHint::Degraded));
    }

    #[test]
    fn deletion_and_error_states() {
        let deleting = resource(json!({
            "object": {"kind": "A", "metadata": {"name": "a", "deletionTimestamp": "2024-01-01T00:00:00Z"}}
        }));
        assert_eq!(status_text(&deleting), "Deleting");

        let errored = resource(json!({
            "object": {"kind": "A", "metadata": {"name": "a"}},
            "error": {"message": "not found"}
        }));
        assert_eq!(status_text(&errored), "Error: not found");
        assert_eq!(to_node(&errored).color, Some(ColorHint::Degraded));
    }

    #[test]
    fn paused_annotation_suffixes_key() {
        let r = resource(json!({
            "object": {"kind": "A", "metadata": {"name": "a", "annotations": {"crossplane.io/paused": "true"}}}
        }));
        let node = to_node(&r);
        assert_eq!(node.key, "A/a (paused)");
        assert_eq!(node.color, Some(ColorHint::Paused));
    }

    #[test]
    fn children_are_mapped_in_order() {
        let r = resource(json!({
            "object": {"kind": "Root", "metadata": {"name": "r"}},
            "children": [
                {"object": {"kind": "A", "metadata": {"name": "1"}}},
                {"object": {"kind": "B", "metadata": {"name": "2"}},
                 "children": [{"object": {"kind": "C", "metadata": {"name": "3"}}}]}
            ]
        }));
        let node = to_node(&r);
        let keys: Vec<&str> = node.children.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["A/1", "B/2"]);
        assert_eq!(node.children[1].children[0].key, "C/3");
    }

    #[test]
    fn ellipsize_truncates_long_text() {
        assert_eq!(ellipsize("short", 10), "short");
        let long = "x".repeat(120);
        let out = ellipsize(&long, STATUS_MAX_CHARS);
        assert_eq!(out.chars().count(), STATUS_MAX_CHARS);
        assert!(out.ends_with('…'));
    }
}
