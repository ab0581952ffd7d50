//! Request Path Tree
//!
//! The hierarchical decomposition of all request paths by segment. Built
//! once from the raw path strings, then canonicalized in place (indexer
//! merge and parameter renames) before any name derivation happens.

pub mod canonicalize;
pub mod names;

pub use canonicalize::canonicalize;

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::error::{EngineError, Result};

/// Where a declared parameter is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
}

/// A parameter declared on a node's path item or operations
#[derive(Debug, Clone, PartialEq)]
pub struct PathParameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
}

impl PathParameter {
    pub fn path(name: &str) -> Self {
        PathParameter {
            name: name.to_string(),
            location: ParameterLocation::Path,
            required: true,
        }
    }

    pub fn query(name: &str) -> Self {
        PathParameter {
            name: name.to_string(),
            location: ParameterLocation::Query,
            required: false,
        }
    }
}

/// One node of the path tree.
///
/// `children` is keyed by raw segment so sibling order is deterministic.
/// `deduplicated_segment`, once set by an indexer merge, permanently
/// overrides `segment` for all naming purposes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathTreeNode {
    pub segment: String,
    /// Full slash-joined ancestry, e.g. `/users/{user-id}/messages`
    pub path: String,
    pub children: BTreeMap<String, PathTreeNode>,
    /// HTTP verbs with an operation on this node
    pub operations: BTreeSet<String>,
    pub parameters: Vec<PathParameter>,
    /// Vendor extensions keyed by extension name
    pub extensions: BTreeMap<String, Value>,
    deduplicated_segment: Option<String>,
}

impl PathTreeNode {
    /// The segment used for naming: the merge override when present
    pub fn identifier(&self) -> &str {
        self.deduplicated_segment
            .as_deref()
            .unwrap_or(&self.segment)
    }

    pub fn deduplicated_segment(&self) -> Option<&str> {
        self.deduplicated_segment.as_deref()
    }

    /// Record a merge rename. The first write sticks.
    pub(crate) fn set_deduplicated_segment(&mut self, name: &str) {
        if self.deduplicated_segment.is_none() {
            self.deduplicated_segment = Some(name.to_string());
        }
    }

    /// Whether this node is an indexer: exactly one bare `{param}` segment
    pub fn is_indexer(&self) -> bool {
        is_single_parameter_segment(self.identifier())
    }

    pub fn add_parameter(&mut self, parameter: PathParameter) {
        if !self
            .parameters
            .iter()
            .any(|p| p.name == parameter.name && p.location == parameter.location)
        {
            self.parameters.push(parameter);
        }
    }
}

/// Exactly one `{param}` and nothing around it. A trailing format extension
/// does not disqualify the segment (`{id}.json` indexes like `{id}`).
pub fn is_single_parameter_segment(segment: &str) -> bool {
    let trimmed = names::strip_format_extension(segment);
    trimmed.starts_with('{')
        && trimmed.ends_with('}')
        && trimmed.matches('{').count() == 1
}

/// The path tree root plus the build API
#[derive(Debug, Default)]
pub struct PathTree {
    pub root: PathTreeNode,
}

impl PathTree {
    pub fn new() -> Self {
        PathTree {
            root: PathTreeNode {
                path: "/".to_string(),
                ..Default::default()
            },
        }
    }

    /// Insert a path, creating intermediate nodes as needed.
    /// Returns the leaf node for further decoration.
    pub fn add_path(&mut self, path: &str) -> Result<&mut PathTreeNode> {
        if !path.starts_with('/') && !path.starts_with('\\') {
            return Err(EngineError::InvalidPath(path.to_string()));
        }
        let mut current = &mut self.root;
        let mut ancestry = String::new();
        for segment in split_path(path) {
            ancestry.push('/');
            ancestry.push_str(segment);
            current = current
                .children
                .entry(segment.to_string())
                .or_insert_with(|| PathTreeNode {
                    segment: segment.to_string(),
                    path: ancestry.clone(),
                    ..Default::default()
                });
        }
        Ok(current)
    }

    /// Insert a path and register an operation verb on its leaf
    pub fn add_operation(&mut self, path: &str, verb: &str) -> Result<()> {
        let node = self.add_path(path)?;
        node.operations.insert(verb.to_lowercase());
        Ok(())
    }

    /// Look a node up by path, following raw segment keys
    pub fn node(&self, path: &str) -> Option<&PathTreeNode> {
        let mut current = &self.root;
        for segment in split_path(path) {
            current = current.children.get(segment)?;
        }
        Some(current)
    }
}

/// Paths may use either separator; empty segments are dropped
pub(crate) fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_path_builds_ancestry() {
        let mut tree = PathTree::new();
        tree.add_operation("/users/{id}/messages", "GET").unwrap();
        let messages = tree.node("/users/{id}/messages").unwrap();
        assert_eq!(messages.segment, "messages");
        assert_eq!(messages.path, "/users/{id}/messages");
        assert!(messages.operations.contains("get"));
        assert_eq!(tree.node("/users").unwrap().path, "/users");
    }

    #[test]
    fn test_relative_path_is_invalid() {
        let mut tree = PathTree::new();
        assert!(matches!(
            tree.add_path("users"),
            Err(EngineError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_single_parameter_segment_detection() {
        assert!(is_single_parameter_segment("{id}"));
        assert!(is_single_parameter_segment("{user-id}"));
        assert!(is_single_parameter_segment("{id}.json"));
        assert!(!is_single_parameter_segment("users"));
        assert!(!is_single_parameter_segment("{a}{b}"));
        assert!(!is_single_parameter_segment("name(id={id})"));
        assert!(!is_single_parameter_segment(""));
    }

    #[test]
    fn test_deduplicated_segment_is_permanent() {
        let mut node = PathTreeNode {
            segment: "{fileId}".to_string(),
            ..Default::default()
        };
        assert_eq!(node.identifier(), "{fileId}");
        node.set_deduplicated_segment("{file-id}");
        node.set_deduplicated_segment("{other}");
        assert_eq!(node.identifier(), "{file-id}");
        assert_eq!(node.deduplicated_segment(), Some("{file-id}"));
    }

    #[test]
    fn test_add_parameter_dedupes_by_name_and_location() {
        let mut node = PathTreeNode::default();
        node.add_parameter(PathParameter::path("id"));
        node.add_parameter(PathParameter::path("id"));
        node.add_parameter(PathParameter::query("id"));
        assert_eq!(node.parameters.len(), 2);
    }
}
