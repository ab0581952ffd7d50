//! Inheritance Index
//!
//! A global base -> derived map over the document's named schemas: every
//! allOf member carrying a reference id registers the declaring schema as a
//! dependent of that base. Built lazily on first use behind a `OnceLock`,
//! so concurrent first readers race harmlessly; once populated the index is
//! read-only for the rest of the run.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::OnceLock;

use tracing::warn;

use super::SchemaDocument;

/// Base/derived edges are acyclic by construction (a schema cannot allOf a
/// descendant of itself), but malformed documents exist; the closure walk
/// stops here and returns what it has.
const MAX_DESCENDANT_DEPTH: usize = 64;

/// Write-once-per-document map: base reference id -> set of derived ids.
/// Identity is case-insensitive; keys are stored lowercased, values keep
/// their declared casing.
#[derive(Debug, Default)]
pub struct InheritanceIndex {
    inner: OnceLock<HashMap<String, BTreeSet<String>>>,
}

impl InheritanceIndex {
    pub(crate) fn ensure_built(&self, doc: &SchemaDocument) {
        self.inner.get_or_init(|| build(doc));
    }

    pub fn is_built(&self) -> bool {
        self.inner.get().is_some()
    }

    /// Direct dependents of a base id
    pub fn direct_dependents(&self, base: &str) -> BTreeSet<String> {
        self.inner
            .get()
            .and_then(|index| index.get(&base.to_lowercase()))
            .cloned()
            .unwrap_or_default()
    }

    /// Transitive closure of dependents, case-insensitively deduplicated
    pub fn all_descendants(&self, base: &str) -> BTreeSet<String> {
        let Some(index) = self.inner.get() else {
            return BTreeSet::new();
        };
        let mut visited: HashSet<String> = HashSet::new();
        let mut out = BTreeSet::new();
        collect_descendants(index, base, 0, &mut visited, &mut out);
        out
    }
}

fn collect_descendants(
    index: &HashMap<String, BTreeSet<String>>,
    base: &str,
    depth: usize,
    visited: &mut HashSet<String>,
    out: &mut BTreeSet<String>,
) {
    if depth >= MAX_DESCENDANT_DEPTH {
        warn!(
            base,
            "inheritance closure exceeded depth cap, returning partial set"
        );
        return;
    }
    if !visited.insert(base.to_lowercase()) {
        return;
    }
    let Some(direct) = index.get(&base.to_lowercase()) else {
        return;
    };
    for derived in direct {
        if out.iter().any(|d| d.eq_ignore_ascii_case(derived)) {
            continue;
        }
        out.insert(derived.clone());
        collect_descendants(index, derived, depth + 1, visited, out);
    }
}

fn build(doc: &SchemaDocument) -> HashMap<String, BTreeSet<String>> {
    let mut index: HashMap<String, BTreeSet<String>> =
        HashMap::with_capacity(doc.schema_count());
    for (name, node_index) in doc.named_schemas() {
        index.entry(name.to_lowercase()).or_default();
        let Some(node) = doc.node(node_index) else {
            continue;
        };
        for &member in &node.all_of {
            if let Some(base) = doc.node(member).and_then(|m| m.reference_id()) {
                index
                    .entry(base.to_lowercase())
                    .or_default()
                    .insert(name.to_string());
            }
        }
    }
    index
}
