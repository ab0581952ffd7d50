//! Discriminator Resolver
//!
//! Computes the effective discriminator property name and the literal
//! value -> type mapping table for a node. Dispatch is a small closed tag
//! computed once per node, so each branch is independently testable. The
//! reference fallback consults the inheritance index.

use std::collections::HashSet;

use super::{SchemaDocument, SchemaIndex, SchemaNode};

const MAX_RESOLVE_DEPTH: usize = 64;

/// Where a node's discriminator mapping comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscriminatorSource {
    /// The node declares a non-empty mapping itself
    Local,
    /// Union of every oneOf member's mappings
    DelegateOneOf,
    /// Union of every anyOf member's mappings
    DelegateAnyOf,
    /// The final allOf member, when it carries a non-empty mapping.
    /// Composition lists are authored most-specific-last by convention, so
    /// only the final member is consulted; a mapping on any earlier member
    /// is ignored (the lint reports it).
    DelegateAllOf(SchemaIndex),
    /// Synthesized from the reference id and its inheritance descendants
    FromReference,
    /// No discriminator information available
    None,
}

/// Classify where `node`'s mapping would come from
pub fn discriminator_source(doc: &SchemaDocument, node: &SchemaNode) -> DiscriminatorSource {
    if node
        .discriminator
        .as_ref()
        .is_some_and(|d| d.has_mapping())
    {
        return DiscriminatorSource::Local;
    }
    if !node.one_of.is_empty() {
        return DiscriminatorSource::DelegateOneOf;
    }
    if !node.any_of.is_empty() {
        return DiscriminatorSource::DelegateAnyOf;
    }
    if let Some(&member) = node.all_of.last() {
        if doc
            .node(member)
            .and_then(|m| m.discriminator.as_ref())
            .is_some_and(|d| d.has_mapping())
        {
            return DiscriminatorSource::DelegateAllOf(member);
        }
    }
    if node.reference_id().is_some() {
        return DiscriminatorSource::FromReference;
    }
    DiscriminatorSource::None
}

/// Effective discriminator property name: the node's own, else the first
/// non-empty result over oneOf, then anyOf, then allOf members.
pub fn property_name(doc: &SchemaDocument, node: &SchemaNode) -> String {
    let mut visited = HashSet::new();
    property_name_guarded(doc, node, &mut visited)
}

fn property_name_guarded(
    doc: &SchemaDocument,
    node: &SchemaNode,
    visited: &mut HashSet<SchemaIndex>,
) -> String {
    if let Some(disc) = &node.discriminator {
        if disc.has_property_name() {
            return disc.property_name.clone();
        }
    }
    for &member in node
        .one_of
        .iter()
        .chain(node.any_of.iter())
        .chain(node.all_of.iter())
    {
        if !visited.insert(member) {
            continue;
        }
        if let Some(member_node) = doc.node(member) {
            let name = property_name_guarded(doc, member_node, visited);
            if !name.is_empty() {
                return name;
            }
        }
    }
    String::new()
}

/// Effective mapping table, ordered, first-wins on duplicate literal values
pub fn mappings(doc: &SchemaDocument, node: &SchemaNode) -> Vec<(String, String)> {
    let mut visited = HashSet::new();
    mappings_guarded(doc, node, 0, &mut visited)
}

fn mappings_guarded(
    doc: &SchemaDocument,
    node: &SchemaNode,
    depth: usize,
    visited: &mut HashSet<SchemaIndex>,
) -> Vec<(String, String)> {
    if depth >= MAX_RESOLVE_DEPTH {
        return Vec::new();
    }
    match discriminator_source(doc, node) {
        DiscriminatorSource::Local => node
            .discriminator
            .as_ref()
            .map(|d| {
                d.mapping
                    .iter()
                    // mappings with an empty key are malformed; skipped
                    .filter(|(key, _)| !key.is_empty())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default(),
        DiscriminatorSource::DelegateOneOf => {
            union_members(doc, &node.one_of, depth, visited)
        }
        DiscriminatorSource::DelegateAnyOf => {
            union_members(doc, &node.any_of, depth, visited)
        }
        DiscriminatorSource::DelegateAllOf(member) => {
            if !visited.insert(member) {
                return Vec::new();
            }
            doc.node(member)
                .map(|m| mappings_guarded(doc, m, depth + 1, visited))
                .unwrap_or_default()
        }
        DiscriminatorSource::FromReference => {
            let id = node.reference_id().unwrap_or_default().to_string();
            let mut out = vec![(id.clone(), id.clone())];
            for descendant in doc.inheritance().all_descendants(&id) {
                union_entry(&mut out, descendant.clone(), descendant);
            }
            out
        }
        DiscriminatorSource::None => Vec::new(),
    }
}

fn union_members(
    doc: &SchemaDocument,
    members: &[SchemaIndex],
    depth: usize,
    visited: &mut HashSet<SchemaIndex>,
) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for &member in members {
        if !visited.insert(member) {
            continue;
        }
        if let Some(member_node) = doc.node(member) {
            for (key, value) in mappings_guarded(doc, member_node, depth + 1, visited) {
                union_entry(&mut out, key, value);
            }
        }
    }
    out
}

fn union_entry(out: &mut Vec<(String, String)>, key: String, value: String) {
    if !out.iter().any(|(existing, _)| *existing == key) {
        out.push((key, value));
    }
}
