//! Document Loading
//!
//! Materializes a `SchemaDocument` arena from parsed JSON values, one value
//! per named declaration. Loading is two-phase: declared names are collected
//! first so `$ref` targets can be validated, then each value is lowered into
//! arena nodes bottom-up. References that point outside the document are
//! rejected up front rather than surfacing as dangling lookups later.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::schema::{Discriminator, SchemaDocument, SchemaIndex, SchemaNode};

const SCHEMAS_POINTER: &str = "#/components/schemas/";
const DEFINITIONS_POINTER: &str = "#/definitions/";

impl SchemaDocument {
    /// Build a document from `(name, schema)` pairs.
    ///
    /// Declaration order is preserved. Every `$ref` must resolve to one of
    /// the declared names (case-insensitively); anything else is an
    /// [`EngineError::ExternalReference`].
    pub fn from_named_values<I, S>(entries: I) -> Result<SchemaDocument>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let entries: Vec<(String, Value)> =
            entries.into_iter().map(|(n, v)| (n.into(), v)).collect();

        let declared: HashSet<String> =
            entries.iter().map(|(n, _)| n.to_lowercase()).collect();

        let mut doc = SchemaDocument::default();
        for (name, value) in &entries {
            let index = lower_value(&mut doc, value, &declared)?;
            doc.register_named(name, index);
        }
        debug!(
            schemas = doc.schema_count(),
            nodes = doc.node_count(),
            "loaded schema document"
        );
        Ok(doc)
    }
}

/// Lower one JSON value into the arena, children first.
fn lower_value(
    doc: &mut SchemaDocument,
    value: &Value,
    declared: &HashSet<String>,
) -> Result<SchemaIndex> {
    let obj = match value {
        Value::Object(map) => map,
        // Boolean schemas ("true" admits anything) carry no shape we act on.
        Value::Bool(_) => return Ok(doc.add_node(SchemaNode::default())),
        other => {
            return Err(EngineError::InvalidDocument(format!(
                "schema must be an object, got {other}"
            )))
        }
    };

    let mut node = SchemaNode::default();

    if let Some(re) = obj.get("$ref").and_then(Value::as_str) {
        node.reference = Some(reference_target(re, declared)?);
        // A reference node stands for its target; inline fields are noise.
        return Ok(doc.add_node(node));
    }

    match obj.get("type") {
        Some(Value::String(kind)) => node.kind = Some(kind.clone()),
        // ["string", "null"] style unions collapse to kind + nullable
        Some(Value::Array(kinds)) => {
            for k in kinds.iter().filter_map(Value::as_str) {
                if k.eq_ignore_ascii_case("null") {
                    node.nullable = true;
                } else {
                    node.kind = Some(k.to_string());
                }
            }
        }
        _ => {}
    }
    if obj.get("nullable").and_then(Value::as_bool) == Some(true) {
        node.nullable = true;
    }
    if let Some(format) = obj.get("format").and_then(Value::as_str) {
        node.format = Some(format.to_string());
    }
    node.deprecated = obj.get("deprecated").and_then(Value::as_bool) == Some(true);

    if let Some(values) = obj.get("enum").and_then(Value::as_array) {
        node.enum_values = values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }

    if let Some(discriminator) = obj.get("discriminator").and_then(Value::as_object) {
        let property_name = discriminator
            .get("propertyName")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let mut mapping = Vec::new();
        if let Some(entries) = discriminator.get("mapping").and_then(Value::as_object) {
            for (key, target) in entries {
                if let Some(target) = target.as_str() {
                    mapping.push((key.clone(), reference_target(target, declared)?));
                }
            }
        }
        node.discriminator = Some(Discriminator {
            property_name,
            mapping,
        });
    }

    if let Some(items) = obj.get("items") {
        node.items = Some(lower_value(doc, items, declared)?);
    }
    if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
        for (name, value) in properties {
            let child = lower_value(doc, value, declared)?;
            node.try_add_property(name, child);
        }
    }
    node.any_of = lower_members(doc, obj.get("anyOf"), declared)?;
    node.all_of = lower_members(doc, obj.get("allOf"), declared)?;
    node.one_of = lower_members(doc, obj.get("oneOf"), declared)?;

    Ok(doc.add_node(node))
}

/// Lower a composition member list, skipping explicit nulls.
fn lower_members(
    doc: &mut SchemaDocument,
    members: Option<&Value>,
    declared: &HashSet<String>,
) -> Result<Vec<SchemaIndex>> {
    let Some(members) = members.and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    members
        .iter()
        .filter(|m| !m.is_null())
        .map(|m| lower_value(doc, m, declared))
        .collect()
}

/// Resolve a `$ref` string to a declared schema name.
fn reference_target(reference: &str, declared: &HashSet<String>) -> Result<String> {
    let name = reference
        .strip_prefix(SCHEMAS_POINTER)
        .or_else(|| reference.strip_prefix(DEFINITIONS_POINTER))
        .unwrap_or(reference);
    if name.is_empty()
        || name.contains('/')
        || name.contains('#')
        || !declared.contains(&name.to_lowercase())
    {
        return Err(EngineError::ExternalReference(reference.to_string()));
    }
    Ok(name.to_string())
}
