//! Document Linting
//!
//! Surfaces composition patterns that resolve silently but rarely mean
//! what the author intended. Lints never fail a run; callers decide how
//! loudly to report them.
//!
//! ## Lints
//! 1. **discriminator-not-last**: an `allOf` member carries a discriminator
//!    mapping but is not the final member of the list, so the positional
//!    tie-break drops it and it never contributes to resolution
//! 2. **untagged-union**: a multi-member `oneOf` with no discriminator
//!    property anywhere, leaving consumers to sniff shapes at runtime
//! 3. **inheritance-cycle**: named schemas that `allOf`-inherit from their
//!    own descendants

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::warn;

use crate::schema::{discriminator, SchemaDocument, SchemaNode};

pub const DISCRIMINATOR_NOT_LAST: &str = "discriminator-not-last";
pub const UNTAGGED_UNION: &str = "untagged-union";
pub const INHERITANCE_CYCLE: &str = "inheritance-cycle";

#[derive(Debug, Clone, PartialEq)]
pub struct LintWarning {
    pub code: &'static str,
    pub message: String,
    /// Named schema the warning points at
    pub schema: String,
}

/// Run every lint over the document's named schemas
pub fn lint_document(doc: &SchemaDocument) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    for (name, index) in doc.named_schemas() {
        let Some(node) = doc.node(index) else { continue };
        check_discriminator_position(doc, name, node, &mut warnings);
        check_untagged_union(doc, name, node, &mut warnings);
    }
    check_inheritance_cycles(doc, &mut warnings);
    for warning in &warnings {
        warn!(code = warning.code, schema = %warning.schema, "{}", warning.message);
    }
    warnings
}

fn check_discriminator_position(
    doc: &SchemaDocument,
    name: &str,
    node: &SchemaNode,
    warnings: &mut Vec<LintWarning>,
) {
    let Some(last) = node.all_of.len().checked_sub(1) else {
        return;
    };
    for (position, &member) in node.all_of.iter().enumerate() {
        let carries_mapping = doc
            .node(member)
            .and_then(|m| m.discriminator.as_ref())
            .is_some_and(|d| d.has_mapping());
        if carries_mapping && position != last {
            warnings.push(LintWarning {
                code: DISCRIMINATOR_NOT_LAST,
                message: format!(
                    "allOf member {position} declares a discriminator mapping \
                     but is not the final member ({last}); only the final \
                     member is consulted, so this mapping never resolves"
                ),
                schema: name.to_string(),
            });
        }
    }
}

fn check_untagged_union(
    doc: &SchemaDocument,
    name: &str,
    node: &SchemaNode,
    warnings: &mut Vec<LintWarning>,
) {
    if node.one_of.len() > 1 && discriminator::property_name(doc, node).is_empty() {
        warnings.push(LintWarning {
            code: UNTAGGED_UNION,
            message: format!(
                "oneOf with {} members has no discriminator property",
                node.one_of.len()
            ),
            schema: name.to_string(),
        });
    }
}

/// Base -> derived edges over named schemas; any strongly connected
/// component bigger than one node (or a self edge) is a cycle.
fn check_inheritance_cycles(doc: &SchemaDocument, warnings: &mut Vec<LintWarning>) {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut indices: HashMap<String, NodeIndex> = HashMap::new();
    for (name, _) in doc.named_schemas() {
        let node = graph.add_node(name.to_string());
        indices.insert(name.to_lowercase(), node);
    }
    for (name, index) in doc.named_schemas() {
        let Some(node) = doc.node(index) else { continue };
        for &member in &node.all_of {
            let Some(base) = doc.node(member).and_then(|m| m.reference_id()) else {
                continue;
            };
            if let Some(&base_index) = indices.get(&base.to_lowercase()) {
                graph.add_edge(base_index, indices[&name.to_lowercase()], ());
            }
        }
    }

    for component in tarjan_scc(&graph) {
        let cyclic = component.len() > 1
            || component
                .first()
                .is_some_and(|&n| graph.find_edge(n, n).is_some());
        if cyclic {
            let mut members: Vec<&str> =
                component.iter().map(|&n| graph[n].as_str()).collect();
            members.sort_unstable();
            warnings.push(LintWarning {
                code: INHERITANCE_CYCLE,
                message: format!("inheritance cycle: {}", members.join(" -> ")),
                schema: members.first().map(|s| s.to_string()).unwrap_or_default(),
            });
        }
    }
}
