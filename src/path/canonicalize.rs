//! Indexer Merge
//!
//! Collapses sibling indexer nodes (`/{fileId}` and `/{itemId}` under the
//! same parent) into one canonical node with a synthesized `{<base>-id}`
//! parameter, then cascades the rename through every descendant path and
//! declared parameter. Runs pre-order, one tree level at a time, and must
//! run exactly once, before any class-name derivation.
//!
//! Each level is handled in two passes: the merge plan is computed over the
//! immutable child map first, then applied, so children are never removed
//! out from under an iterator.

use tracing::warn;

use super::{split_path, ParameterLocation, PathTree, PathTreeNode};

/// Canonicalize the tree in place
pub fn canonicalize(tree: &mut PathTree) {
    merge_index_nodes_at_same_level(&mut tree.root);
}

fn merge_index_nodes_at_same_level(node: &mut PathTreeNode) {
    // pass 1: plan over the immutable child map
    let mut indexer_keys: Vec<String> = node
        .children
        .iter()
        .filter(|(_, child)| child.is_indexer())
        .map(|(key, _)| key.clone())
        .collect();
    indexer_keys.sort_by_key(|key| key.to_lowercase());

    // pass 2: apply
    if indexer_keys.len() > 1 {
        let canonical_key = &indexer_keys[0];
        if let Some(mut canonical) = node.children.remove(canonical_key) {
            let old_name = parameter_name(canonical_key).to_string();
            let new_segment = synthesize_parameter_segment(&old_name);
            let new_name = parameter_name(&new_segment).to_string();
            // the node's own segment is the last one in its path; an
            // identically named ancestor segment must not be touched
            let segment_index = split_path(&canonical.path).count().saturating_sub(1);

            canonical.path = replace_path_segment(&canonical.path, segment_index, &new_segment);
            canonical.set_deduplicated_segment(&new_segment);
            rename_declared_parameter(&mut canonical, &old_name, &new_name);

            for sibling_key in &indexer_keys[1..] {
                if let Some(sibling) = node.children.remove(sibling_key) {
                    merge_node(&mut canonical, sibling, sibling_key, &new_segment, segment_index);
                }
            }
            replace_parameter_for_descendants(&mut canonical, segment_index, &new_segment);
            node.children.insert(new_segment, canonical);
        }
    }

    for child in node.children.values_mut() {
        merge_index_nodes_at_same_level(child);
    }
}

/// `{fileId}` -> `{file-id}`; a name already ending in `-id` is kept
fn synthesize_parameter_segment(old_name: &str) -> String {
    if old_name.to_lowercase().ends_with("-id") {
        return format!("{{{old_name}}}");
    }
    let base = old_name
        .strip_suffix("id")
        .or_else(|| old_name.strip_suffix("Id"))
        .or_else(|| old_name.strip_suffix("ID"))
        .unwrap_or(old_name);
    format!("{{{base}-id}}")
}

fn parameter_name(segment: &str) -> &str {
    segment.trim_matches(['{', '}'])
}

/// Rewrite exactly the segment at `index`, leaving any segment elsewhere in
/// the path alone even when it spells the same text.
fn replace_path_segment(path: &str, index: usize, new_segment: &str) -> String {
    let mut segments: Vec<String> = split_path(path).map(str::to_string).collect();
    if segments.len() > index {
        segments[index] = new_segment.to_string();
    }
    format!("/{}", segments.join("/"))
}

/// Fold `source` into `destination`, rewriting the merged level's path
/// segment (at `segment_index`) in copied paths and renaming declared
/// parameters as it goes.
fn merge_node(
    destination: &mut PathTreeNode,
    mut source: PathTreeNode,
    old_segment: &str,
    new_segment: &str,
    segment_index: usize,
) {
    let old_name = parameter_name(old_segment).to_string();
    let new_name = parameter_name(new_segment).to_string();
    rename_declared_parameter(&mut source, &old_name, &new_name);

    for operation in std::mem::take(&mut source.operations) {
        if !destination.operations.insert(operation.clone()) {
            warn!(
                operation = %operation,
                path = %destination.path,
                "duplicate operation dropped while merging indexer siblings"
            );
        }
    }
    for (key, value) in std::mem::take(&mut source.extensions) {
        if destination.extensions.contains_key(&key) {
            warn!(
                extension = %key,
                path = %destination.path,
                "duplicate extension dropped while merging indexer siblings"
            );
        } else {
            destination.extensions.insert(key, value);
        }
    }
    for parameter in std::mem::take(&mut source.parameters) {
        destination.add_parameter(parameter);
    }

    for (key, mut child) in std::mem::take(&mut source.children) {
        child.path = replace_path_segment(&child.path, segment_index, new_segment);
        match destination.children.remove(&key) {
            Some(existing) => {
                // key collision: keep the existing node, fold the copy in
                let mut kept = existing;
                merge_node(&mut kept, child, old_segment, new_segment, segment_index);
                destination.children.insert(key, kept);
            }
            None => {
                destination.children.insert(key, child);
            }
        }
    }
}

/// Rewrite the path segment at `index` for every descendant, and rename
/// each descendant's declared path parameter that matched the old value.
fn replace_parameter_for_descendants(
    node: &mut PathTreeNode,
    index: usize,
    new_segment: &str,
) {
    let new_name = parameter_name(new_segment).to_string();
    for child in node.children.values_mut() {
        let mut segments: Vec<String> = split_path(&child.path).map(str::to_string).collect();
        if segments.len() > index {
            let old_name = parameter_name(&segments[index]).to_string();
            segments[index] = new_segment.to_string();
            child.path = format!("/{}", segments.join("/"));
            rename_declared_parameter(child, &old_name, &new_name);
        }
        replace_parameter_for_descendants(child, index, new_segment);
    }
}

fn rename_declared_parameter(node: &mut PathTreeNode, old_name: &str, new_name: &str) {
    for parameter in &mut node.parameters {
        if parameter.location == ParameterLocation::Path && parameter.name == old_name {
            parameter.name = new_name.to_string();
        }
    }
}
