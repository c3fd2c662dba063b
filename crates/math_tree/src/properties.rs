//! Per-pass node properties
//!
//! Properties are transient annotations that a pass attaches to nodes (for
//! example the collapse marker of the complexity pass). They live in a side
//! table keyed by [`NodeId`] and are never serialized with the tree.

use crate::NodeId;
use std::collections::{BTreeMap, HashMap};

/// Well-known property names
pub mod keys {
    /// Marker text of a collapsed node
    pub const COLLAPSE_MARKER: &str = "collapse-marker";
    /// True complexity of a collapsed node
    pub const COLLAPSE_COMPLEXITY: &str = "collapse-complexity";
    /// Set by the parser when a token should use its alternate glyph form
    pub const VARIANT_FORM: &str = "variantForm";
    /// Set by the parser on superscripts that are primes
    pub const TEX_PRIME_STYLE: &str = "texprimestyle";
}

/// A property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            PropertyValue::Text(s) => !s.is_empty(),
            PropertyValue::Number(n) => *n != 0.0,
            PropertyValue::Flag(b) => *b,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Flag(b)
    }
}

/// Side table of node properties
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    entries: HashMap<NodeId, BTreeMap<String, PropertyValue>>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: NodeId, key: &str) -> Option<&PropertyValue> {
        self.entries.get(&node).and_then(|props| props.get(key))
    }

    pub fn has(&self, node: NodeId, key: &str) -> bool {
        self.get(node, key).is_some()
    }

    pub fn set(&mut self, node: NodeId, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.entries
            .entry(node)
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn remove(&mut self, node: NodeId, key: &str) -> Option<PropertyValue> {
        let props = self.entries.get_mut(&node)?;
        let value = props.remove(key);
        if props.is_empty() {
            self.entries.remove(&node);
        }
        value
    }

    /// Nodes carrying the given property, in arena order
    pub fn nodes_with(&self, key: &str) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .entries
            .iter()
            .filter(|(_, props)| props.contains_key(key))
            .map(|(id, _)| *id)
            .collect();
        nodes.sort();
        nodes
    }

    /// Property names set on one node
    pub fn keys(&self, node: NodeId) -> Vec<&str> {
        self.entries
            .get(&node)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
