//! Layout documents: collections authored as JSON.
//!
//! A document is either a collection object or a bare array of parts:
//!
//! ```json
//! {
//!   "labels": { "sis": "Siblings" },
//!   "defaults": { "height": 320 },
//!   "items": [
//!     { "tab_path": ["sis"], "filter": "wave == 1", "payload": { "type": "bar" } },
//!     { "kind": "pagination_break" },
//!     { "labels": { "age": "Age" }, "items": [ ... ] }
//!   ]
//! }
//! ```
//!
//! Each entry of `items` (or of the top-level array) is an item object, or a
//! nested collection object recognised by its `items` key. A nested
//! collection's `defaults` apply only to its own items.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use dashtree_shared::{ContentItem, DashtreeError, LabelMap, Result};

use crate::collection::{Collection, Part, combine};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CollectionDoc {
    #[serde(default)]
    labels: LabelMap,
    #[serde(default)]
    defaults: Map<String, Value>,
    items: Vec<Value>,
}

impl TryFrom<Value> for Part {
    type Error = DashtreeError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) if fields.contains_key("items") => {
                collection_from_fields(fields).map(Part::Collection)
            }
            Value::Object(fields) => serde_json::from_value::<ContentItem>(Value::Object(fields))
                .map(Part::Item)
                .map_err(|e| DashtreeError::invalid_combination(format!("not an item: {e}"))),
            other => Err(DashtreeError::invalid_combination(format!(
                "expected a collection or item, got {}",
                kind_name(&other)
            ))),
        }
    }
}

impl Collection {
    /// Append an item given as JSON.
    ///
    /// Fails with [`DashtreeError::InvalidCombination`] unless `value` is an
    /// item object.
    pub fn append_value(&mut self, value: Value) -> Result<()> {
        match Part::try_from(value)? {
            Part::Item(item) => {
                self.append(item);
                Ok(())
            }
            Part::Collection(_) => Err(DashtreeError::invalid_combination(
                "append takes an item; use combine for collections",
            )),
        }
    }
}

fn collection_from_fields(fields: Map<String, Value>) -> Result<Collection> {
    let doc: CollectionDoc = serde_json::from_value(Value::Object(fields))
        .map_err(|e| DashtreeError::invalid_combination(format!("not a collection: {e}")))?;

    let mut collection = Collection::with_defaults(doc.defaults);
    collection.set_labels(&doc.labels);
    for (index, entry) in doc.items.into_iter().enumerate() {
        let part = Part::try_from(entry).map_err(|e| match e {
            DashtreeError::InvalidCombination { message } => {
                DashtreeError::invalid_combination(format!("items[{index}]: {message}"))
            }
            other => other,
        })?;
        collection.extend_part(part);
    }
    Ok(collection)
}

/// Build a collection from a parsed layout document.
pub fn collection_from_value(value: Value) -> Result<Collection> {
    match value {
        Value::Array(entries) => {
            let parts = entries
                .into_iter()
                .map(Part::try_from)
                .collect::<Result<Vec<_>>>()?;
            combine(parts)
        }
        Value::Object(fields) if fields.contains_key("items") => collection_from_fields(fields),
        other => Err(DashtreeError::invalid_combination(format!(
            "layout must be a collection object or an array of parts, got {}",
            kind_name(&other)
        ))),
    }
}

/// Parse a layout document from JSON text.
pub fn parse_layout(json: &str) -> Result<Collection> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| DashtreeError::parse(format!("invalid layout JSON: {e}")))?;
    collection_from_value(value)
}

/// Load a layout document from disk.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_layout(path: &Path) -> Result<Collection> {
    let content = std::fs::read_to_string(path).map_err(|e| DashtreeError::io(path, e))?;
    let collection = parse_layout(&content)?;
    debug!(
        items = collection.len(),
        labels = collection.labels().len(),
        "layout loaded"
    );
    Ok(collection)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
