//! Reference Graph Walker
//!
//! Collects the reference ids reachable from a schema node. Real-world
//! schemas are self-referential (a Folder holding child Folders), so the
//! walk carries a visited set scoped to the top-level call and skips any
//! node it has already entered on that call.

use std::collections::HashSet;

use super::{SchemaDocument, SchemaIndex};

/// Collect reference ids reachable from `start`, deduplicated, preserving
/// first-seen order: self reference, then items, then property values, then
/// anyOf, allOf, oneOf. Returns empty for a missing node.
pub fn collect_reference_ids(doc: &SchemaDocument, start: Option<SchemaIndex>) -> Vec<String> {
    let mut visited = HashSet::new();
    let mut out = Vec::new();
    collect_into(doc, start, &mut visited, &mut out);
    out
}

fn collect_into(
    doc: &SchemaDocument,
    current: Option<SchemaIndex>,
    visited: &mut HashSet<SchemaIndex>,
    out: &mut Vec<String>,
) {
    let Some(index) = current else {
        return;
    };
    // Cycle guard: a node already entered contributes nothing further
    if !visited.insert(index) {
        return;
    }
    let Some(node) = doc.node(index) else {
        return;
    };

    if let Some(id) = node.reference_id() {
        if !out.iter().any(|existing| existing == id) {
            out.push(id.to_string());
        }
    }

    collect_into(doc, node.items, visited, out);
    for &(_, prop) in &node.properties {
        collect_into(doc, Some(prop), visited, out);
    }
    for &member in node
        .any_of
        .iter()
        .chain(node.all_of.iter())
        .chain(node.one_of.iter())
    {
        collect_into(doc, Some(member), visited, out);
    }
}
