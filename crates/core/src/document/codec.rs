//! The flat-key ⇄ nested-document transform.
//!
//! `copy` rows address leaves by dotted key (`hero.button1Text`); the
//! sites are built from one nested JSON document per page. Both the
//! materializer and the admin editor go through this codec, so it must be
//! a two-sided inverse for well-formed input: flattening a document built
//! from a record set reproduces the same keys and equivalent values.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::keypath::KeyPath;
use crate::record::validate::KeyPathError;
use crate::record::{classify_kind, ContentRecord};

use super::node::{LeafValue, Node};

/// A page's nested content document. Derived state: rebuilt from records
/// on every load or materialization run, never the source of truth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: BTreeMap<String, Node>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Nest a set of flat records into a document.
    ///
    /// Later records with an identical key overwrite earlier ones. A key
    /// whose prefix collides with an existing leaf (`hero` stored next to
    /// `hero.title`) replaces the leaf with a mapping so the deeper key
    /// wins deterministically.
    pub fn from_records<'a, I>(records: I) -> Result<Self, KeyPathError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut document = Document::new();
        for (key, value) in records {
            let path = KeyPath::parse(key)?;
            document.insert_leaf(&path, LeafValue::decode(key, value));
        }
        Ok(document)
    }

    /// Flatten back into storage records for a page. Depth-first; empty
    /// mappings produce nothing. The `type` column is re-derived from the
    /// key (`image` vs `text`), matching what the editor always wrote.
    pub fn to_records(&self, page: &str, locale: &str) -> Vec<ContentRecord> {
        let mut records = Vec::new();
        flatten_into(&self.root, &mut Vec::new(), page, locale, &mut records);
        records
    }

    /// Read the leaf or subtree at a dotted path, as build-time JSON.
    pub fn get(&self, path: &KeyPath) -> Option<Value> {
        let mut current = self.root.get(&path.segments()[0])?;
        for segment in &path.segments()[1..] {
            match current {
                Node::Mapping(children) => current = children.get(segment)?,
                Node::Leaf(_) => return None,
            }
        }
        Some(current.to_json())
    }

    /// Set the leaf (or subtree, when given an object) at a dotted path.
    pub fn set(&mut self, path: &KeyPath, value: Value) {
        let node = Node::from_json(value);
        self.insert_node(path, node);
    }

    fn insert_leaf(&mut self, path: &KeyPath, leaf: LeafValue) {
        self.insert_node(path, Node::Leaf(leaf));
    }

    fn insert_node(&mut self, path: &KeyPath, node: Node) {
        let mut current = &mut self.root;
        for segment in path.parents() {
            let entry = current
                .entry(segment.clone())
                .or_insert_with(Node::empty_mapping);
            if !entry.is_mapping() {
                *entry = Node::empty_mapping();
            }
            match entry {
                Node::Mapping(children) => current = children,
                Node::Leaf(_) => unreachable!("leaf replaced with mapping above"),
            }
        }
        current.insert(path.leaf().to_string(), node);
    }

    /// The whole document as build-time JSON (what gets written to
    /// `content/<locale>/<page>.json`).
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.root
                .iter()
                .map(|(name, node)| (name.clone(), node.to_json()))
                .collect(),
        )
    }

    /// Rebuild a document from edited JSON (the admin save payload).
    pub fn from_json(value: Value) -> Self {
        match Node::from_json(value) {
            Node::Mapping(root) => Document { root },
            // A non-object payload has no keys to flatten; treat as empty.
            Node::Leaf(_) => Document::new(),
        }
    }
}

fn flatten_into(
    children: &BTreeMap<String, Node>,
    prefix: &mut Vec<String>,
    page: &str,
    locale: &str,
    records: &mut Vec<ContentRecord>,
) {
    for (name, node) in children {
        prefix.push(name.clone());
        match node {
            Node::Mapping(grandchildren) => {
                flatten_into(grandchildren, prefix, page, locale, records);
            }
            Node::Leaf(leaf) => {
                let key = prefix.join(".");
                let kind = classify_kind(&key);
                records.push(ContentRecord::new(page, locale, key, leaf.encode(), kind));
            }
        }
        prefix.pop();
    }
}
