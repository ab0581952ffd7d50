//! Schema Classification Predicates
//!
//! Pure, stateless predicates over a single node and its immediate
//! composition children. Referenced content is never followed: a node
//! carrying a reference id is opaque and counts as meaningful on its own.
//!
//! "Meaningful" is always computed against immediate children only.
//! Looking one level deeper (flattening wrapper-only composition layers)
//! is an explicit, depth-limited step, never implicit in a predicate.

use super::{SchemaDocument, SchemaIndex, SchemaNode};

/// Suppression flags for [`is_meaningful`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MeaningfulOptions {
    pub ignore_enums: bool,
    pub ignore_arrays: bool,
    pub ignore_kind: bool,
    /// A bare nullable "object" kind alone does not count
    pub ignore_nullable_objects: bool,
}

impl MeaningfulOptions {
    pub fn ignoring_enums() -> Self {
        Self {
            ignore_enums: true,
            ..Default::default()
        }
    }

    /// Ignore enum, array and type information; used to ask "does this node
    /// carry own fields beyond its shape tag"
    pub fn structure_only() -> Self {
        Self {
            ignore_enums: true,
            ignore_arrays: true,
            ignore_kind: true,
            ignore_nullable_objects: false,
        }
    }

    pub fn ignoring_nullable_objects() -> Self {
        Self {
            ignore_nullable_objects: true,
            ..Default::default()
        }
    }
}

/// Does this node carry real information, or is it just a nullability or
/// typing wrapper? Single source of truth for every other predicate here.
pub fn is_meaningful(node: &SchemaNode, options: MeaningfulOptions) -> bool {
    if !node.properties.is_empty() {
        return true;
    }
    if !options.ignore_enums && !node.enum_values.is_empty() {
        return true;
    }
    if !options.ignore_arrays && node.items.is_some() {
        return true;
    }
    if !options.ignore_kind && !node.kind_str().is_empty() {
        let bare_nullable_object =
            options.ignore_nullable_objects && node.nullable && node.kind_str() == "object";
        if !bare_nullable_object {
            return true;
        }
    }
    if node.format.as_deref().is_some_and(|f| !f.is_empty()) {
        return true;
    }
    node.reference_id().is_some()
}

/// Array with a non-trivial element type. Arrays-of-union-of-wrapper are
/// common, so the element's composition is flattened one level before the
/// element is dismissed as empty.
pub fn is_array(doc: &SchemaDocument, node: &SchemaNode) -> bool {
    if node.kind_str() != "array" {
        return false;
    }
    let Some(items) = node.items.and_then(|idx| doc.node(idx)) else {
        return false;
    };
    is_composed_enum(doc, items)
        || is_enum(items)
        || is_meaningful(items, MeaningfulOptions::default())
        || items
            .any_of
            .iter()
            .chain(items.all_of.iter())
            .chain(items.one_of.iter())
            .filter_map(|&idx| doc.node(idx))
            .any(|member| is_meaningful(member, MeaningfulOptions::default()))
}

/// String enumeration with at least one non-empty literal. Numeric and
/// boolean enumerations are intentionally unsupported.
pub fn is_enum(node: &SchemaNode) -> bool {
    node.enum_values.iter().any(|v| !v.is_empty())
        && matches!(node.kind_str(), "" | "string")
}

/// Nullable-enum / open-enum pattern: exactly one composition member is a
/// bare wrapper (non-meaningful once enum-ness is ignored) while exactly one
/// member is itself an enum.
pub fn is_composed_enum(doc: &SchemaDocument, node: &SchemaNode) -> bool {
    composed_enum_members(doc, &node.any_of) || composed_enum_members(doc, &node.one_of)
}

fn composed_enum_members(doc: &SchemaDocument, members: &[SchemaIndex]) -> bool {
    if members.is_empty() {
        return false;
    }
    let nodes: Vec<&SchemaNode> = members.iter().filter_map(|&idx| doc.node(idx)).collect();
    nodes
        .iter()
        .filter(|m| !is_meaningful(m, MeaningfulOptions::ignoring_enums()))
        .count()
        == 1
        && nodes.iter().filter(|m| is_enum(m)).count() == 1
}

/// A real choice between two or more non-trivial shapes via anyOf, not just
/// "object or null"
pub fn is_inclusive_union(doc: &SchemaDocument, node: &SchemaNode) -> bool {
    count_meaningful_ignoring_nullable_objects(doc, &node.any_of) > 1
}

/// A real choice between two or more non-trivial shapes via oneOf
pub fn is_exclusive_union(doc: &SchemaDocument, node: &SchemaNode) -> bool {
    count_meaningful_ignoring_nullable_objects(doc, &node.one_of) > 1
}

fn count_meaningful_ignoring_nullable_objects(
    doc: &SchemaDocument,
    members: &[SchemaIndex],
) -> usize {
    members
        .iter()
        .filter_map(|&idx| doc.node(idx))
        .filter(|m| is_meaningful(m, MeaningfulOptions::ignoring_nullable_objects()))
        .count()
}

/// Genuine multi-shape allOf composition: more than one named base, or more
/// than one anonymous member. A single named base plus trivial constraints
/// is inheritance, not intersection.
pub fn is_intersection(doc: &SchemaDocument, node: &SchemaNode) -> bool {
    let members: Vec<&SchemaNode> = node
        .all_of
        .iter()
        .filter_map(|&idx| doc.node(idx))
        .filter(|m| is_meaningful(m, MeaningfulOptions::default()) || !m.all_of.is_empty())
        .collect();
    members
        .iter()
        .filter(|m| m.reference_id().is_some())
        .count()
        > 1
        || members
            .iter()
            .filter(|m| m.reference_id().is_none())
            .count()
            > 1
}

/// Exactly one named base class plus optional own fields, as distinct from
/// [`is_intersection`]
pub fn is_inherited(doc: &SchemaDocument, node: &SchemaNode) -> bool {
    let members: Vec<&SchemaNode> = flatten_single_trivial_member(doc, &node.all_of)
        .iter()
        .filter_map(|&idx| doc.node(idx))
        .filter(|m| is_meaningful(m, MeaningfulOptions::structure_only()))
        .collect();
    let root_is_meaningful = is_meaningful(node, MeaningfulOptions::structure_only());
    members
        .iter()
        .filter(|m| m.reference_id().is_some())
        .count()
        == 1
        && (members
            .iter()
            .filter(|m| m.reference_id().is_none())
            .count()
            == 1
            || root_is_meaningful)
}

/// One-level flatten applied only when the list holds a single wrapper-only
/// entry (no own properties, no reference id): that entry is replaced by its
/// allOf children. Deeper nesting is left alone.
fn flatten_single_trivial_member(doc: &SchemaDocument, members: &[SchemaIndex]) -> Vec<SchemaIndex> {
    if members.len() == 1 {
        if let Some(only) = doc.node(members[0]) {
            if only.properties.is_empty()
                && only.reference_id().is_none()
                && !only.all_of.is_empty()
            {
                return only.all_of.clone();
            }
        }
    }
    members.to_vec()
}

/// Legacy primitive-wrapper convention: a 3-member exclusive union of
/// {enum string, numeric-or-integer, plain string}. Isolated here so the
/// special case can be dropped without touching the rest of the classifier.
pub fn is_odata_primitive(doc: &SchemaDocument, node: &SchemaNode) -> bool {
    is_exclusive_union(doc, node) && odata_primitive_members(doc, &node.one_of)
}

/// Same pattern expressed through anyOf by older description emitters
pub fn is_odata_primitive_backward_compatible(doc: &SchemaDocument, node: &SchemaNode) -> bool {
    is_odata_primitive(doc, node)
        || (is_inclusive_union(doc, node) && odata_primitive_members(doc, &node.any_of))
}

fn odata_primitive_members(doc: &SchemaDocument, members: &[SchemaIndex]) -> bool {
    if members.len() != 3 {
        return false;
    }
    let nodes: Vec<&SchemaNode> = members.iter().filter_map(|&idx| doc.node(idx)).collect();
    nodes.iter().filter(|m| is_enum(m)).count() == 1
        && nodes
            .iter()
            .filter(|m| matches!(m.kind_str(), "number" | "integer"))
            .count()
            == 1
        && nodes.iter().filter(|m| m.kind_str() == "string").count() == 2
}
