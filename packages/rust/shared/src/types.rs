//! Core domain types for dashtree layouts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// ItemKind
// ---------------------------------------------------------------------------

/// Distinguishes ordinary content from a structural pagination marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Renderable content (chart, text block, table, ...).
    #[default]
    Content,
    /// Page boundary sentinel. Never rendered.
    PaginationBreak,
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// A row-selection predicate attached to an item.
///
/// dashtree never evaluates filters. It only compares their canonical forms,
/// so the representation is kept opaque: either the predicate's source text
/// or an arbitrary structured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filter {
    /// Predicate source text, e.g. `wave == 1`.
    Expression(String),
    /// Structured predicate, e.g. `{"field": "wave", "equal": 1}`.
    Structured(Value),
}

impl Filter {
    /// Canonical text form. Two filters are the same predicate iff their
    /// canonical forms are identical.
    ///
    /// Structured filters are rendered as compact JSON with object keys in
    /// sorted order. Nothing else is normalized.
    pub fn canonical(&self) -> String {
        match self {
            Self::Expression(expr) => format!("expr:{expr}"),
            Self::Structured(value) => {
                let mut out = String::from("json:");
                write_canonical_json(value, &mut out);
                out
            }
        }
    }
}

impl From<&str> for Filter {
    fn from(expr: &str) -> Self {
        Self::Expression(expr.to_string())
    }
}

fn write_canonical_json(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical_json(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(values) => {
            out.push('[');
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical_json(v, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

// ---------------------------------------------------------------------------
// ContentItem
// ---------------------------------------------------------------------------

/// One authored entry in a collection.
///
/// `insertion_index` is assigned by the collection on `append` and rewritten
/// on every `combine`; whatever a layout document supplies is overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentItem {
    /// Content or pagination marker.
    #[serde(default)]
    pub kind: ItemKind,
    /// Tab path segments. Empty means top-level, untabbed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tab_path: Vec<String>,
    /// Optional row-selection predicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    /// Position in the final combined order (1-based).
    #[serde(default)]
    pub insertion_index: usize,
    /// Display label for this item's own tab when it becomes a container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_tabset: Option<String>,
    /// Opaque renderable content.
    #[serde(default)]
    pub payload: Value,
}

impl ContentItem {
    /// A content item with the given payload and no tab path or filter.
    pub fn new(payload: Value) -> Self {
        Self {
            kind: ItemKind::Content,
            tab_path: Vec::new(),
            filter: None,
            insertion_index: 0,
            title_tabset: None,
            payload,
        }
    }

    /// A pagination marker.
    pub fn pagination_marker() -> Self {
        Self {
            kind: ItemKind::PaginationBreak,
            ..Self::new(Value::Null)
        }
    }

    pub fn with_tab_path<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tab_path = segments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_title_tabset(mut self, title: impl Into<String>) -> Self {
        self.title_tabset = Some(title.into());
        self
    }

    /// True only for pagination markers.
    pub fn pagination_break(&self) -> bool {
        self.kind == ItemKind::PaginationBreak
    }
}

// ---------------------------------------------------------------------------
// LabelMap
// ---------------------------------------------------------------------------

/// Tab segment name → display label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap(BTreeMap<String, String>);

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, label: impl Into<String>) {
        self.0.insert(name.into(), label.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Label for `name`, falling back to the name itself.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }

    /// Merge `other` into `self`. Entries from `other` win on collision.
    pub fn merge(&mut self, other: &LabelMap) {
        for (name, label) in &other.0 {
            self.0.insert(name.clone(), label.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_canonical_sorts_object_keys() {
        let a = Filter::Structured(json!({"field": "wave", "equal": 1}));
        let b = Filter::Structured(json!({"equal": 1, "field": "wave"}));
        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), r#"json:{"equal":1,"field":"wave"}"#);
    }

    #[test]
    fn filter_canonical_keeps_syntax() {
        let a = Filter::from("wave == 1");
        let b = Filter::from("wave==1");
        assert_ne!(a.canonical(), b.canonical());
    }

    #[test]
    fn expression_and_structured_string_differ() {
        let expr = Filter::from("w1");
        let structured = Filter::Structured(json!("w1"));
        assert_ne!(expr.canonical(), structured.canonical());
    }

    #[test]
    fn filter_deserializes_untagged() {
        let expr: Filter = serde_json::from_str(r#""wave == 1""#).expect("expr");
        assert!(matches!(expr, Filter::Expression(_)));
        let structured: Filter = serde_json::from_str(r#"{"wave": 1}"#).expect("structured");
        assert!(matches!(structured, Filter::Structured(_)));
    }

    #[test]
    fn content_item_defaults_from_json() {
        let item: ContentItem =
            serde_json::from_str(r#"{"tab_path": ["sis"], "filter": "w1"}"#).expect("parse");
        assert_eq!(item.kind, ItemKind::Content);
        assert_eq!(item.tab_path, vec!["sis"]);
        assert_eq!(item.filter, Some(Filter::from("w1")));
        assert_eq!(item.payload, Value::Null);
        assert!(!item.pagination_break());
    }

    #[test]
    fn pagination_marker_kind() {
        let marker: ContentItem =
            serde_json::from_str(r#"{"kind": "pagination_break"}"#).expect("parse");
        assert!(marker.pagination_break());
        assert!(ContentItem::pagination_marker().pagination_break());
    }

    #[test]
    fn content_item_rejects_unknown_fields() {
        let parsed = serde_json::from_str::<ContentItem>(r#"{"tabpath": ["a"]}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn label_map_merge_later_wins() {
        let mut labels: LabelMap = [("g", "Group"), ("h", "H")].into_iter().collect();
        let later: LabelMap = [("g", "Renamed")].into_iter().collect();
        labels.merge(&later);
        assert_eq!(labels.get("g"), Some("Renamed"));
        assert_eq!(labels.get("h"), Some("H"));
        assert_eq!(labels.resolve("missing"), "missing");
    }
}
