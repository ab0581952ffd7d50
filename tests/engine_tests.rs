//! End-to-End Engine Tests
//!
//! Exercises the whole pipeline the way the surrounding builder does:
//! load a document from JSON, classify and merge its schemas, resolve
//! discriminators through the inheritance index, and canonicalize a
//! request-path tree before deriving names.

use std::collections::HashSet;

use serde_json::json;

use schema_canon::path::names;
use schema_canon::schema::{classify, discriminator, merge, walker};
use schema_canon::{
    canonicalize, EngineError, MeaningfulOptions, ParameterLocation, PathParameter, PathTree,
    SchemaDocument,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_external_reference_aborts_the_load() {
    let result = SchemaDocument::from_named_values([(
        "Broken",
        json!({
            "type": "object",
            "properties": { "other": { "$ref": "other.yaml#/components/schemas/Entity" } }
        }),
    )]);
    assert!(matches!(result, Err(EngineError::ExternalReference(_))));
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn test_meaningful_is_false_only_for_empty_shapes() {
    let doc = SchemaDocument::from_named_values([
        ("Empty", json!({})),
        ("Typed", json!({ "type": "string" })),
        ("Formatted", json!({ "format": "int64" })),
        ("Enumerated", json!({ "enum": ["a"] })),
        ("WithItems", json!({ "type": "array", "items": { "type": "string" } })),
    ])
    .unwrap();

    let node = |name: &str| doc.node(doc.resolve(name).unwrap()).unwrap();
    assert!(!classify::is_meaningful(node("Empty"), MeaningfulOptions::default()));
    for name in ["Typed", "Formatted", "Enumerated", "WithItems"] {
        assert!(classify::is_meaningful(node(name), MeaningfulOptions::default()));
    }
}

#[test]
fn test_odata_primitive_needs_all_three_members() {
    let enum_member = json!({ "enum": ["none", "infinite"], "type": "string" });
    let number_member = json!({ "type": "number", "format": "double" });
    let string_member = json!({ "type": "string" });

    let doc = SchemaDocument::from_named_values([
        (
            "Full",
            json!({ "oneOf": [enum_member, number_member, string_member] }),
        ),
        (
            "TwoMembers",
            json!({ "oneOf": [
                { "type": "number", "format": "double" },
                { "type": "string" }
            ] }),
        ),
    ])
    .unwrap();

    let full = doc.node(doc.resolve("Full").unwrap()).unwrap();
    assert!(classify::is_odata_primitive(&doc, full));

    let two = doc.node(doc.resolve("TwoMembers").unwrap()).unwrap();
    assert!(!classify::is_odata_primitive(&doc, two));
}

// =============================================================================
// Reference Walking
// =============================================================================

#[test]
fn test_reference_collection_survives_cycles() {
    let doc = SchemaDocument::from_named_values([
        (
            "Node",
            json!({
                "type": "object",
                "properties": {
                    "children": {
                        "type": "array",
                        "items": { "$ref": "#/components/schemas/Node" }
                    },
                    "owner": { "$ref": "#/components/schemas/User" }
                }
            }),
        ),
        ("User", json!({ "type": "object" })),
    ])
    .unwrap();

    let ids = walker::collect_reference_ids(&doc, doc.resolve("Node"));
    assert_eq!(ids, vec!["Node".to_string(), "User".to_string()]);
}

// =============================================================================
// Intersection Merge
// =============================================================================

#[test]
fn test_merge_is_idempotent_and_first_member_wins() {
    let doc = SchemaDocument::from_named_values([(
        "Entity",
        json!({
            "allOf": [
                { "type": "object", "properties": { "x": { "type": "string" } } },
                { "type": "object", "properties": {
                    "x": { "type": "integer" },
                    "y": { "type": "boolean" }
                } }
            ]
        }),
    )])
    .unwrap();

    let entity = doc.node(doc.resolve("Entity").unwrap()).unwrap();
    let merged = merge::merge_intersection(&doc, entity, &HashSet::new(), false, None);
    assert!(merged.all_of.is_empty());
    assert_eq!(merged.properties.len(), 2);

    // "x" keeps the first member's declaration
    let x = doc.node(merged.property("x").unwrap()).unwrap();
    assert_eq!(x.kind_str(), "string");

    // merging the merged result changes nothing
    let again = merge::merge_intersection(&doc, &merged, &HashSet::new(), false, None);
    assert_eq!(again, merged);
}

// =============================================================================
// Inheritance & Discriminators
// =============================================================================

fn pet_document() -> SchemaDocument {
    SchemaDocument::from_named_values([
        (
            "Pet",
            json!({
                "type": "object",
                "properties": { "name": { "type": "string" } }
            }),
        ),
        (
            "Cat",
            json!({ "allOf": [
                { "$ref": "#/components/schemas/Pet" },
                { "type": "object", "properties": { "lives": { "type": "integer" } } }
            ] }),
        ),
        (
            "Kitten",
            json!({ "allOf": [
                { "$ref": "#/components/schemas/Cat" },
                { "type": "object", "properties": { "cuteness": { "type": "integer" } } }
            ] }),
        ),
    ])
    .unwrap()
}

#[test]
fn test_all_descendants_is_transitive() {
    let doc = pet_document();
    let descendants = doc.inheritance().all_descendants("Pet");
    let expected: Vec<&str> = vec!["Cat", "Kitten"];
    assert_eq!(descendants.iter().map(String::as_str).collect::<Vec<_>>(), expected);
}

#[test]
fn test_reference_only_node_maps_itself_and_descendants() {
    let doc = pet_document();
    let pet_ref = doc.node(doc.resolve("Cat").unwrap()).unwrap().all_of[0];
    let pet_ref_node = doc.node(pet_ref).unwrap();
    let mappings = discriminator::mappings(&doc, pet_ref_node);
    assert_eq!(
        mappings,
        vec![
            ("Pet".to_string(), "Pet".to_string()),
            ("Cat".to_string(), "Cat".to_string()),
            ("Kitten".to_string(), "Kitten".to_string()),
        ]
    );
}

#[test]
fn test_one_of_mappings_union_in_member_order() {
    let doc = SchemaDocument::from_named_values([
        ("Cat", json!({ "type": "object" })),
        ("Dog", json!({ "type": "object" })),
        (
            "Pet",
            json!({
                "oneOf": [
                    { "$ref": "#/components/schemas/Cat" },
                    { "$ref": "#/components/schemas/Dog" }
                ],
                "discriminator": { "propertyName": "kind" }
            }),
        ),
    ])
    .unwrap();

    let pet = doc.node(doc.resolve("Pet").unwrap()).unwrap();
    assert_eq!(discriminator::property_name(&doc, pet), "kind");
    assert_eq!(
        discriminator::mappings(&doc, pet),
        vec![
            ("Cat".to_string(), "Cat".to_string()),
            ("Dog".to_string(), "Dog".to_string()),
        ]
    );
}

// =============================================================================
// Path Canonicalization & Naming
// =============================================================================

#[test]
fn test_drive_indexer_merge_scenario() {
    init_tracing();
    let mut tree = PathTree::new();
    tree.add_operation("/drive/{fileId}", "GET").unwrap();
    {
        let content = tree.add_path("/drive/{fileId}/content").unwrap();
        content.operations.insert("get".to_string());
        content.add_parameter(PathParameter::path("fileId"));
    }
    tree.add_operation("/drive/{itemId}", "DELETE").unwrap();
    canonicalize(&mut tree);

    let drive = tree.node("/drive").unwrap();
    assert_eq!(drive.children.len(), 1);

    let merged = drive.children.get("{file-id}").unwrap();
    assert_eq!(merged.path, "/drive/{file-id}");
    assert!(merged.operations.contains("get") && merged.operations.contains("delete"));

    let content = merged.children.get("content").unwrap();
    assert_eq!(content.path, "/drive/{file-id}/content");
    assert!(content
        .parameters
        .iter()
        .any(|p| p.name == "file-id" && p.location == ParameterLocation::Path));

    assert_eq!(names::class_name(merged, None), "File");
}

#[test]
fn test_namespace_and_class_name_derivation() {
    let mut tree = PathTree::new();
    tree.add_operation("/users/{id}/messages", "GET").unwrap();
    canonicalize(&mut tree);

    let messages = tree.node("/users/{id}/messages").unwrap();
    assert_eq!(
        names::namespace_from_path(&messages.path, "Graph"),
        "Graph.Users.Item.Messages"
    );
    assert_eq!(
        names::class_name(messages, Some("microsoft.graph.message")),
        "Message"
    );

    let indexer = tree.node("/users/{id}").unwrap();
    assert_eq!(names::class_name(indexer, None), "Users");
}
