//! Intersection Merger
//!
//! Folds an inheritance-style allOf composition into one synthesized node.
//! The input graph is never mutated; the result is an owned clone whose
//! property indices still point into the document arena.

use std::collections::HashSet;

use super::classify::{self, MeaningfulOptions};
use super::{SchemaDocument, SchemaIndex, SchemaNode};

/// Member filter applied before a composition member is merged
pub type MemberFilter<'a> = &'a dyn Fn(&SchemaNode) -> bool;

/// Merge an allOf composition into a single synthesized node.
///
/// If `node` is not an intersection and `force_override` is false, an
/// unchanged clone is returned. `exclude` holds arena indices of members the
/// caller has already incorporated (a base class merged separately); they
/// are dropped rather than merged twice.
///
/// Property union is first-writer-wins: a later member never overwrites an
/// earlier member's declaration of the same property name. This ordering is
/// the load-bearing tie-break for field-origin precedence.
pub fn merge_intersection(
    doc: &SchemaDocument,
    node: &SchemaNode,
    exclude: &HashSet<SchemaIndex>,
    force_override: bool,
    filter: Option<MemberFilter<'_>>,
) -> SchemaNode {
    if !force_override && !classify::is_intersection(doc, node) {
        return node.clone();
    }

    let mut merged = node.clone();
    merged.all_of.clear();

    let selected = select_members(doc, &node.all_of, exclude, filter);
    let merged_members: Vec<SchemaNode> = selected
        .iter()
        .filter_map(|&idx| doc.node(idx))
        .map(|member| merge_intersection(doc, member, exclude, force_override, filter))
        .collect();

    for member in &merged_members {
        for (name, value) in &member.properties {
            merged.try_add_property(name, *value);
        }
    }

    for member in &merged_members {
        let Some(member_disc) = &member.discriminator else {
            continue;
        };
        match &mut merged.discriminator {
            None => merged.discriminator = Some(member_disc.clone()),
            Some(disc) if !disc.has_property_name() && member_disc.has_property_name() => {
                disc.property_name = member_disc.property_name.clone();
            }
            Some(disc) if !disc.has_mapping() && member_disc.has_mapping() => {
                disc.mapping = member_disc.mapping.clone();
            }
            Some(_) => {}
        }
    }

    merged
}

/// Convenience wrapper for a node addressed by arena index
pub fn merge_intersection_at(
    doc: &SchemaDocument,
    index: SchemaIndex,
    exclude: &HashSet<SchemaIndex>,
    force_override: bool,
    filter: Option<MemberFilter<'_>>,
) -> Option<SchemaNode> {
    doc.node(index)
        .map(|node| merge_intersection(doc, node, exclude, force_override, filter))
}

/// Keep members that are meaningful (or themselves composed) and pass the
/// filter, splicing wrapper-only intersection layers one level deep: a
/// member with a non-empty allOf but no own properties and no reference id
/// is replaced by its allOf children. Deeper real content is untouched.
fn select_members(
    doc: &SchemaDocument,
    members: &[SchemaIndex],
    exclude: &HashSet<SchemaIndex>,
    filter: Option<MemberFilter<'_>>,
) -> Vec<SchemaIndex> {
    let mut selected = Vec::with_capacity(members.len());
    for &index in members {
        if exclude.contains(&index) {
            continue;
        }
        let Some(member) = doc.node(index) else {
            // composition lists never contain null; skip defensively
            continue;
        };
        if !classify::is_meaningful(member, MeaningfulOptions::default())
            && member.all_of.is_empty()
        {
            continue;
        }
        if let Some(f) = filter {
            if !f(member) {
                continue;
            }
        }
        let wrapper_only = !member.all_of.is_empty()
            && member.properties.is_empty()
            && member.reference_id().is_none();
        if wrapper_only {
            selected.extend(member.all_of.iter().copied().filter(|i| !exclude.contains(i)));
        } else {
            selected.push(index);
        }
    }
    selected
}
