use std::collections::BTreeMap;

use serde_json::Value;

/// The decoded value at a leaf of a content document.
///
/// Stored values are always strings; a string whose trimmed text starts
/// with `[` or `{` is treated as serialized JSON (lists of labeled items,
/// nested blocks). The two cases stay distinguishable so re-encoding
/// round-trips and a failed parse can be reported instead of masked.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    /// A plain text value, kept verbatim.
    Text(String),
    /// A JSON array or object parsed out of the stored string.
    Structured(Value),
}

impl LeafValue {
    /// Decode a stored string. A value that looks like JSON but fails to
    /// parse is kept as raw text; that case is logged per key so a
    /// half-edited list does not silently ship as a string.
    pub fn decode(key: &str, raw: &str) -> Self {
        let trimmed = raw.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            match serde_json::from_str::<Value>(raw) {
                Ok(value) => return LeafValue::Structured(value),
                Err(err) => {
                    tracing::warn!(key, %err, "value looks like JSON but failed to parse; keeping raw string");
                }
            }
        }
        LeafValue::Text(raw.to_string())
    }

    /// Re-encode into the stored string form.
    pub fn encode(&self) -> String {
        match self {
            LeafValue::Text(s) => s.clone(),
            LeafValue::Structured(value) => {
                serde_json::to_string(value).expect("Value serialization is infallible")
            }
        }
    }

    /// The build-time JSON view of this leaf.
    pub fn to_json(&self) -> Value {
        match self {
            LeafValue::Text(s) => Value::String(s.clone()),
            LeafValue::Structured(value) => value.clone(),
        }
    }
}

/// A node in a content document. Flattening and nesting dispatch on this
/// tag: mappings recurse, everything else (scalars and whole arrays
/// alike) is a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(LeafValue),
    Mapping(BTreeMap<String, Node>),
}

impl Node {
    pub fn empty_mapping() -> Self {
        Node::Mapping(BTreeMap::new())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Node::Leaf(LeafValue::Text(value.into()))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    /// Build a node from an edited JSON document. Objects become
    /// mappings; strings stay text; arrays, numbers, booleans and null
    /// become structured leaves (they are JSON-serialized on save, as the
    /// editor always did for non-string values).
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Node::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, Node::from_json(v)))
                    .collect(),
            ),
            Value::String(s) => Node::Leaf(LeafValue::Text(s)),
            other => Node::Leaf(LeafValue::Structured(other)),
        }
    }

    /// The build-time JSON view of this subtree.
    pub fn to_json(&self) -> Value {
        match self {
            Node::Leaf(leaf) => leaf.to_json(),
            Node::Mapping(children) => Value::Object(
                children
                    .iter()
                    .map(|(name, child)| (name.clone(), child.to_json()))
                    .collect(),
            ),
        }
    }
}
