//! Collections of content items and their combination algebra.
//!
//! A [`Collection`] is an ordered accumulation of [`ContentItem`]s plus a
//! [`LabelMap`] and a default-parameter overlay. Collections combine by
//! concatenation; every combination renumbers `insertion_index` from 1 so the
//! final order never depends on how the parts were authored.

use std::ops::Add;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use dashtree_shared::{ContentItem, DashtreeError, LabelMap, Result};

/// First index handed out by a fresh collection.
const FIRST_INDEX: usize = 1;

/// An ordered, combinable accumulation of items.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    items: Vec<ContentItem>,
    labels: LabelMap,
    defaults: Map<String, Value>,
    next_index: usize,
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Collection {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            labels: LabelMap::new(),
            defaults: Map::new(),
            next_index: FIRST_INDEX,
        }
    }

    /// A collection whose appended payloads receive `defaults`.
    pub fn with_defaults(defaults: Map<String, Value>) -> Self {
        Self {
            defaults,
            ..Self::new()
        }
    }

    pub fn set_default(&mut self, key: impl Into<String>, value: Value) {
        self.defaults.insert(key.into(), value);
    }

    /// Register a display label for a tab segment.
    pub fn label(&mut self, name: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(name, label);
    }

    pub fn set_labels(&mut self, labels: &LabelMap) {
        self.labels.merge(labels);
    }

    /// Append an item, overlaying the collection defaults onto its payload and
    /// assigning the next insertion index. Markers carry no payload to overlay.
    pub fn append(&mut self, mut item: ContentItem) {
        if !item.pagination_break() {
            apply_defaults(&mut item.payload, &self.defaults);
        }
        self.push(item);
    }

    /// Append `item` and return `self`, for builder-style chaining.
    pub fn with(mut self, item: ContentItem) -> Self {
        self.append(item);
        self
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ContentItem> {
        self.items
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a part to the end of this collection.
    ///
    /// Items are appended with this collection's defaults. A collection is
    /// concatenated as-is: its payloads keep the defaults they were authored
    /// with and its labels override ours. Its defaults stay with it, so items
    /// appended afterwards still get ours.
    pub fn extend_part(&mut self, part: Part) {
        match part {
            Part::Item(item) => self.append(item),
            Part::Collection(other) => self.concat_items(other),
        }
    }

    fn concat(&mut self, mut other: Collection) {
        for (key, value) in std::mem::take(&mut other.defaults) {
            self.defaults.insert(key, value);
        }
        self.concat_items(other);
    }

    fn concat_items(&mut self, other: Collection) {
        self.labels.merge(&other.labels);
        for item in other.items {
            self.push(item);
        }
    }

    fn push(&mut self, mut item: ContentItem) {
        item.insertion_index = self.next_index;
        self.next_index += 1;
        self.items.push(item);
    }
}

/// Anything that can take part in a combination.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Collection(Collection),
    /// A bare item, treated as a one-item collection.
    Item(ContentItem),
}

impl From<Collection> for Part {
    fn from(collection: Collection) -> Self {
        Self::Collection(collection)
    }
}

impl From<ContentItem> for Part {
    fn from(item: ContentItem) -> Self {
        Self::Item(item)
    }
}

/// Combine parts into a new collection.
///
/// The result holds every part's items in argument order with
/// `insertion_index` renumbered `1..=n`. Labels and defaults merge left to
/// right, later parts winning on key collision.
#[instrument(skip_all)]
pub fn combine<I, P>(parts: I) -> Result<Collection>
where
    I: IntoIterator<Item = P>,
    P: Into<Part>,
{
    let mut combined = Collection::new();
    let mut count = 0usize;

    for part in parts {
        match part.into() {
            // Bare items carry no defaults of their own.
            Part::Item(item) => combined.push(item),
            Part::Collection(other) => combined.concat(other),
        }
        count += 1;
    }

    if count == 0 {
        return Err(DashtreeError::invalid_combination(
            "combine needs at least one collection or item",
        ));
    }

    debug!(parts = count, items = combined.len(), "combined collections");
    Ok(combined)
}

impl Add for Collection {
    type Output = Collection;

    fn add(self, rhs: Collection) -> Collection {
        // Renumbering from scratch keeps `a + b` identical to `combine([a, b])`.
        let mut combined = Collection::new();
        combined.concat(self);
        combined.concat(rhs);
        combined
    }
}

/// Insert each default missing from an object payload.
fn apply_defaults(payload: &mut Value, defaults: &Map<String, Value>) {
    if defaults.is_empty() {
        return;
    }
    match payload {
        Value::Object(fields) => {
            for (key, value) in defaults {
                fields.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        Value::Null => *payload = Value::Object(defaults.clone()),
        _ => {}
    }
}
