//! Schema Graph Arena
//!
//! The schema graph is possibly cyclic and heavily shared (many nodes stand
//! for the same named declaration), so nodes live in an arena owned by
//! `SchemaDocument` and every cross-reference is a `SchemaIndex`. Traversals
//! carry an explicit visited set; revisiting a node is expected, not an error.
//!
//! The document and its nodes are read-only inputs to the engine. Derived
//! state (the inheritance index) is computed on first use and never rebuilt.

pub mod classify;
pub mod discriminator;
pub mod inheritance;
pub mod loader;
pub mod merge;
pub mod walker;

pub use classify::MeaningfulOptions;
pub use discriminator::DiscriminatorSource;
pub use inheritance::InheritanceIndex;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Handle into the document's node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaIndex(pub(crate) usize);

/// Discriminator declaration: a property whose runtime value selects the
/// concrete shape, plus an ordered literal-value -> reference-id mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Discriminator {
    pub property_name: String,
    /// Ordered; duplicate keys are first-wins
    pub mapping: Vec<(String, String)>,
}

impl Discriminator {
    pub fn has_property_name(&self) -> bool {
        !self.property_name.is_empty()
    }

    pub fn has_mapping(&self) -> bool {
        !self.mapping.is_empty()
    }
}

/// A single data-shape declaration, named or inline.
///
/// `kind` is a free-form tag rather than a closed enumeration: real-world
/// descriptions carry unexpected values and the classifier must tolerate
/// them. A node with a `reference` stands for the named schema it points at
/// and its inline fields are ignored by classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Free-form type tag: "object", "array", "string", "number", ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Whether the type admits null alongside `kind`
    #[serde(default)]
    pub nullable: bool,
    /// Ordered property map; names unique, insertion order meaningful
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<(String, SchemaIndex)>,
    /// Array element schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaIndex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaIndex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaIndex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaIndex>,
    /// Identifier of the named schema this node stands for, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
    /// String literals; numeric and boolean enumerations are unsupported
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
}

impl SchemaNode {
    pub fn reference_id(&self) -> Option<&str> {
        self.reference.as_deref().filter(|r| !r.is_empty())
    }

    pub fn kind_str(&self) -> &str {
        self.kind.as_deref().unwrap_or("")
    }

    /// First-wins property insert; returns false when the name was taken
    pub fn try_add_property(&mut self, name: &str, value: SchemaIndex) -> bool {
        if self.properties.iter().any(|(n, _)| n == name) {
            return false;
        }
        self.properties.push((name.to_string(), value));
        true
    }

    pub fn property(&self, name: &str) -> Option<SchemaIndex> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, idx)| idx)
    }
}

/// The loaded document: node arena plus the named-declaration index
#[derive(Debug, Default)]
pub struct SchemaDocument {
    pub(crate) nodes: Vec<SchemaNode>,
    /// Declared schemas in insertion order
    pub(crate) named: Vec<(String, SchemaIndex)>,
    /// Case-insensitive name lookup (lowercased key)
    pub(crate) by_name: HashMap<String, SchemaIndex>,
    pub(crate) inheritance: InheritanceIndex,
}

impl SchemaDocument {
    pub fn node(&self, index: SchemaIndex) -> Option<&SchemaNode> {
        self.nodes.get(index.0)
    }

    /// Resolve a declared schema name, case-insensitively
    pub fn resolve(&self, name: &str) -> Option<SchemaIndex> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    /// Declared schemas in insertion order
    pub fn named_schemas(&self) -> impl Iterator<Item = (&str, SchemaIndex)> {
        self.named.iter().map(|(n, idx)| (n.as_str(), *idx))
    }

    pub fn schema_count(&self) -> usize {
        self.named.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Reference ids reachable from a named schema, first-seen order
    pub fn refs_out(&self, name: &str) -> Vec<String> {
        match self.resolve(name) {
            Some(idx) => walker::collect_reference_ids(self, Some(idx)),
            None => Vec::new(),
        }
    }

    /// The base -> derived index, built on first access
    pub fn inheritance(&self) -> &InheritanceIndex {
        // Build is idempotent; concurrent first callers race harmlessly.
        self.inheritance.ensure_built(self);
        &self.inheritance
    }

    pub(crate) fn add_node(&mut self, node: SchemaNode) -> SchemaIndex {
        let index = SchemaIndex(self.nodes.len());
        self.nodes.push(node);
        index
    }

    pub(crate) fn register_named(&mut self, name: &str, index: SchemaIndex) {
        self.named.push((name.to_string(), index));
        self.by_name.insert(name.to_lowercase(), index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_add_property_first_wins() {
        let mut node = SchemaNode::default();
        assert!(node.try_add_property("x", SchemaIndex(0)));
        assert!(!node.try_add_property("x", SchemaIndex(1)));
        assert_eq!(node.property("x"), Some(SchemaIndex(0)));
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let mut doc = SchemaDocument::default();
        let idx = doc.add_node(SchemaNode::default());
        doc.register_named("microsoft.graph.User", idx);
        assert_eq!(doc.resolve("MICROSOFT.GRAPH.USER"), Some(idx));
        assert_eq!(doc.resolve("missing"), None);
    }
}
