//! Path flattening
//!
//! Converts a nested JSON object into an ordered list of dot-joined leaf paths
//! and back. Traversal is depth-first and keeps sibling insertion order, so
//! the flattened order is the order in which keys appear in the source
//! document (serde_json is built with `preserve_order`).
//!
//! ```text
//! {"user": {"name": "J", "tags": ["a"]}, "age": 5}
//!   -> user.name = "J"
//!      user.tags = ["a"]      (arrays are opaque leaves)
//!      age       = 5
//! ```

use crate::error::{Error, Result};
use ahash::AHashMap;
use serde_json::{Map, Number, Value};

/// Separator joining key segments into a leaf path.
pub const PATH_SEPARATOR: char = '.';

/// A non-object value found at a leaf path.
///
/// Objects never appear here: they are always descended into. Arrays are kept
/// whole and never recursed.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
}

impl LeafValue {
    /// Convert a JSON value into a leaf. Returns `None` for objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(b)),
            Value::Number(n) => Some(Self::Number(n)),
            Value::String(s) => Some(Self::String(s)),
            Value::Array(items) => Some(Self::Array(items)),
            Value::Object(_) => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(b),
            Self::Number(n) => Value::Number(n),
            Self::String(s) => Value::String(s),
            Self::Array(items) => Value::Array(items),
        }
    }
}

impl From<LeafValue> for Value {
    fn from(leaf: LeafValue) -> Self {
        leaf.into_value()
    }
}

/// Ordered mapping from leaf path to leaf value.
///
/// Iteration follows insertion order. Re-inserting an existing path replaces
/// its value in place without moving it.
#[derive(Debug, Clone, Default)]
pub struct FlattenedRecord {
    entries: Vec<(String, LeafValue)>,
    index: AHashMap<String, usize>,
}

impl FlattenedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a leaf, returning the value it replaced if the path was present.
    pub fn insert(&mut self, path: impl Into<String>, value: LeafValue) -> Option<LeafValue> {
        let path = path.into();
        if let Some(&slot) = self.index.get(&path) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        self.index.insert(path.clone(), self.entries.len());
        self.entries.push((path, value));
        None
    }

    pub fn get(&self, path: &str) -> Option<&LeafValue> {
        self.index.get(path).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Leaf paths in traversal order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(path, _)| path.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LeafValue)> {
        self.entries.iter().map(|(path, value)| (path.as_str(), value))
    }
}

impl PartialEq for FlattenedRecord {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl IntoIterator for FlattenedRecord {
    type Item = (String, LeafValue);
    type IntoIter = std::vec::IntoIter<(String, LeafValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, LeafValue)> for FlattenedRecord {
    fn from_iter<I: IntoIterator<Item = (K, LeafValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (path, value) in iter {
            record.insert(path, value);
        }
        record
    }
}

/// Flatten a JSON object into its leaf paths.
///
/// Fails with [`Error::StructuralAmbiguity`] when two leaves produce the same
/// path, which only happens when a key itself contains [`PATH_SEPARATOR`]
/// (`{"a.b": 1, "a": {"b": 2}}`).
pub fn flatten(tree: &Map<String, Value>) -> Result<FlattenedRecord> {
    let mut record = FlattenedRecord::new();
    flatten_into(tree, "", &mut record)?;
    Ok(record)
}

/// Flatten any JSON value, requiring the root to be an object.
pub fn flatten_value(tree: &Value) -> Result<FlattenedRecord> {
    match tree {
        Value::Object(map) => flatten(map),
        other => Err(Error::InvalidInput(format!(
            "expected a JSON object at the root, got {}",
            json_kind(other)
        ))),
    }
}

fn flatten_into(
    tree: &Map<String, Value>,
    prefix: &str,
    record: &mut FlattenedRecord,
) -> Result<()> {
    for (key, value) in tree {
        let path = format!("{prefix}{key}");
        let leaf = match value {
            Value::Object(child) => {
                flatten_into(child, &format!("{path}{PATH_SEPARATOR}"), record)?;
                continue;
            }
            Value::Null => LeafValue::Null,
            Value::Bool(b) => LeafValue::Bool(*b),
            Value::Number(n) => LeafValue::Number(n.clone()),
            Value::String(s) => LeafValue::String(s.clone()),
            Value::Array(items) => LeafValue::Array(items.clone()),
        };
        if record.contains(&path) {
            return Err(ambiguity(&path, key));
        }
        record.insert(path, leaf);
    }
    Ok(())
}

/// Rebuild a nested JSON object from leaf paths.
///
/// Paths sharing a prefix share the intermediate object. A path that needs
/// to descend through an existing leaf, or a leaf that would replace an
/// existing intermediate object, fails with [`Error::StructuralAmbiguity`]
/// instead of silently dropping data.
pub fn unflatten(record: &FlattenedRecord) -> Result<Map<String, Value>> {
    let mut root = Map::new();
    for (path, value) in record.iter() {
        insert_path(&mut root, path, value.clone().into_value())?;
    }
    Ok(root)
}

fn insert_path(root: &mut Map<String, Value>, path: &str, value: Value) -> Result<()> {
    let mut segments = path.split(PATH_SEPARATOR).peekable();
    let mut node = root;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            if matches!(node.get(segment), Some(Value::Object(_))) {
                return Err(ambiguity(path, segment));
            }
            node.insert(segment.to_string(), value);
            return Ok(());
        }

        let child = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        node = match child {
            Value::Object(map) => map,
            _ => return Err(ambiguity(path, segment)),
        };
    }

    Ok(())
}

fn ambiguity(path: &str, segment: &str) -> Error {
    Error::StructuralAmbiguity {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
