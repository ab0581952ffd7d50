//! Path Naming
//!
//! Derives namespace and class names from canonicalized path-tree nodes.
//! Indexer segments collapse into a shared `item` placeholder, parameter
//! segments render as `With<Param>`, and reserved words are escaped rather
//! than dropped so nothing collides with serialization-format namespaces.

use std::sync::LazyLock;

use regex::Regex;

use super::{is_single_parameter_segment, split_path, PathTreeNode};

/// Placeholder for a single-parameter segment in a namespace
pub const ITEM_PLACEHOLDER: &str = "item";
const ESCAPED_SUFFIX: &str = "Escaped";
const WITH_KEYWORD: &str = "With";
/// Segment sub-names that collide with format namespaces
const RESERVED_SEGMENTS: [&str; 6] = ["json", "xml", "csv", "yaml", "yml", "txt"];
const NAMESPACE_SPLIT_CHARS: [char; 3] = ['.', '-', '$'];

// {id}, name(idParam={id}), name(idParam='{id}')
static PATH_PARAMETERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?P<prefix>\w+)?(?P<equals>=?)'?\{(?P<param>\w+)\}'?,?")
        .unwrap()
});

// trailing "id"-like suffix of an indexer class name
static ID_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)-?id\d?\}?$")
        .unwrap()
});

static FORMAT_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\.(?:json|yaml|yml|csv|txt)$")
        .unwrap()
});

/// Drop a trailing `.json`-style extension so `{id}.json` indexes like `{id}`
pub(crate) fn strip_format_extension(segment: &str) -> &str {
    match FORMAT_EXTENSION.find(segment) {
        Some(m) => &segment[..m.start()],
        None => segment,
    }
}

/// Derive the namespace for a node's path.
///
/// Single-parameter segments become the `item` placeholder; every segment
/// is delimiter-split, camel-joined, escaped when reserved, and
/// capitalized; segments join with `.` only when both sides are non-empty.
pub fn namespace_from_path(path: &str, prefix: &str) -> String {
    split_path(path)
        .map(|segment| {
            if is_single_parameter_segment(segment) {
                ITEM_PLACEHOLDER.to_string()
            } else {
                segment.to_string()
            }
        })
        .map(|segment| {
            segment
                .split(NAMESPACE_SPLIT_CHARS)
                .filter(|s| !s.is_empty())
                .enumerate()
                .map(|(idx, sub)| {
                    if idx == 0 {
                        sub.to_string()
                    } else {
                        capitalize(sub)
                    }
                })
                .collect::<String>()
        })
        .map(|segment| {
            if RESERVED_SEGMENTS
                .iter()
                .any(|r| r.eq_ignore_ascii_case(&segment))
            {
                format!("{segment}{ESCAPED_SUFFIX}")
            } else {
                segment
            }
        })
        .map(|segment| capitalize(&cleanup_symbol_name(&segment)))
        .fold(prefix.to_string(), |acc, segment| {
            join_non_empty(&acc, &segment)
        })
}

/// Derive the class name for a node.
///
/// An associated schema reference id wins outright. Otherwise the
/// (possibly deduplicated) segment is cleaned of parameter syntax, and an
/// indexer node additionally loses its trailing "id"-like suffix, falling
/// back to the parent segment when nothing but the parameter keyword
/// remains.
pub fn class_name(node: &PathTreeNode, schema_reference: Option<&str>) -> String {
    let reference = schema_reference.filter(|r| !r.is_empty());
    let raw = match reference {
        Some(reference) => reference.to_string(),
        None => {
            let mut raw = cleanup_parameters_from_path(node.identifier());
            if node.is_indexer() {
                let stripped = ID_SUFFIX.replace(&raw, "").to_string();
                if stripped != raw {
                    raw = stripped;
                    // {id} alone leaves just the keyword; name after the parent
                    if raw == WITH_KEYWORD {
                        raw = parent_segment(&node.path).unwrap_or_default();
                    }
                }
            }
            raw
        }
    };

    let mut segments: Vec<&str> = raw.split('.').filter(|s| !s.is_empty()).collect();
    // a single-segment name like `Json` must survive the reserved-word skip
    if segments.len() > 1 {
        segments.retain(|s| !RESERVED_SEGMENTS.iter().any(|r| r.eq_ignore_ascii_case(s)));
    }
    capitalize(&cleanup_symbol_name(segments.last().unwrap_or(&"")))
}

/// `{param}` renders as `With<Param>`; call-style parentheses are dropped
pub(crate) fn cleanup_parameters_from_path(segment: &str) -> String {
    if segment.is_empty() {
        return String::new();
    }
    PATH_PARAMETERS
        .replace_all(segment, |caps: &regex::Captures| {
            let param = capitalize(&caps["param"]);
            if caps.name("equals").is_some_and(|m| !m.as_str().is_empty()) {
                format!("{WITH_KEYWORD}{param}")
            } else {
                let prefix = caps.name("prefix").map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{WITH_KEYWORD}{param}")
            }
        })
        .replace(['(', ')'], "")
}

fn parent_segment(path: &str) -> Option<String> {
    let segments: Vec<&str> = split_path(path).collect();
    segments
        .len()
        .checked_sub(2)
        .map(|idx| capitalize(segments[idx]))
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Keep only characters valid in a code symbol
fn cleanup_symbol_name(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

fn join_non_empty(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        (false, false) => format!("{left}.{right}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_replaces_parameter_with_item() {
        assert_eq!(
            namespace_from_path(r"\users\{id}\messages", "Graph"),
            "Graph.Users.Item.Messages"
        );
    }

    #[test]
    fn test_namespace_camel_joins_delimited_segments() {
        assert_eq!(
            namespace_from_path("/directory-objects/$count", "Api"),
            "Api.DirectoryObjects.Count"
        );
    }

    #[test]
    fn test_namespace_escapes_reserved_segments() {
        assert_eq!(namespace_from_path("/export/json", ""), "Export.JsonEscaped");
    }

    #[test]
    fn test_namespace_empty_prefix_and_path() {
        assert_eq!(namespace_from_path("", "Graph"), "Graph");
        assert_eq!(namespace_from_path("/users", ""), "Users");
    }

    #[test]
    fn test_class_name_prefers_schema_reference() {
        let node = PathTreeNode {
            segment: "messages".to_string(),
            path: "/users/{id}/messages".to_string(),
            ..Default::default()
        };
        assert_eq!(
            class_name(&node, Some("microsoft.graph.message")),
            "Message"
        );
        assert_eq!(class_name(&node, None), "Messages");
    }

    #[test]
    fn test_class_name_renders_parameters_with_keyword() {
        let node = PathTreeNode {
            segment: "name(idParam='{id}')".to_string(),
            path: "/things/name(idParam='{id}')".to_string(),
            ..Default::default()
        };
        assert_eq!(class_name(&node, None), "NameWithId");
    }

    #[test]
    fn test_indexer_class_name_strips_id_suffix() {
        let node = PathTreeNode {
            segment: "{file-id}".to_string(),
            path: "/drive/{file-id}".to_string(),
            ..Default::default()
        };
        assert_eq!(class_name(&node, None), "File");
    }

    #[test]
    fn test_bare_id_indexer_falls_back_to_parent_segment() {
        let node = PathTreeNode {
            segment: "{id}".to_string(),
            path: "/users/{id}".to_string(),
            ..Default::default()
        };
        assert_eq!(class_name(&node, None), "Users");
    }

    #[test]
    fn test_class_name_skips_reserved_only_when_multi_segment() {
        let node = PathTreeNode {
            segment: "report.json".to_string(),
            path: "/report.json".to_string(),
            ..Default::default()
        };
        assert_eq!(class_name(&node, None), "Report");

        let bare = PathTreeNode {
            segment: "json".to_string(),
            path: "/json".to_string(),
            ..Default::default()
        };
        assert_eq!(class_name(&bare, None), "Json");
    }
}
