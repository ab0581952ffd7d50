//! Schema Canon
//!
//! The composition and path-resolution engine behind a description-driven
//! API code generator: it decides what each declared schema *is* and what
//! each request path should be *called*, before any code is emitted.
//!
//! ## Features
//!
//! - **Classification**: union/intersection/enum/array predicates over
//!   composed schema declarations
//! - **Intersection Merge**: `allOf` members folded into one synthetic
//!   type with first-wins property precedence
//! - **Inheritance Index**: lazy build-once base -> derived lookup
//! - **Discriminator Resolution**: effective property name and mapping
//!   table across unions, intersections, and references
//! - **Path Canonicalization**: indexer-node deduplication plus namespace
//!   and class-name derivation from request paths
//!
//! ## Pipeline
//!
//! ```text
//! parsed description
//! ├── SchemaDocument::from_named_values   (loader, rejects external refs)
//! ├── PathTree::add_operation ...
//! ├── path::canonicalize                  (exactly once, before naming)
//! ├── classify / merge / discriminator    (per schema, on demand)
//! └── lint::lint_document                 (advisory)
//! ```

pub mod error;
pub mod lint;
pub mod path;
pub mod schema;

pub use error::{EngineError, Result};
pub use lint::LintWarning;
pub use path::{canonicalize, ParameterLocation, PathParameter, PathTree, PathTreeNode};
pub use schema::{
    Discriminator, DiscriminatorSource, InheritanceIndex, MeaningfulOptions, SchemaDocument,
    SchemaIndex, SchemaNode,
};
