//! Entity Schema Resolution and Consistency Checking
//!
//! Tooling for a registry of named entities, each optionally providing a
//! JSON-Schema document and an example body.
//!
//! ## Features
//!
//! - **Reference Resolution**: inline referenced entities under `definitions`
//!   so each schema is self-contained
//! - **Output Rewriting**: convert `#/definitions/` references to the
//!   published `#/components/schemas/` form
//! - **Consistency Checking**: verify that a runtime type and its schema
//!   describe the same data shape
//! - **Definition Collection**: merge every entity's definitions into one
//!   table, rejecting conflicts and case-insensitive name collisions
//! - **Example Validation**: check each entity's example against its schema
//!
//! ## Architecture
//!
//! ```text
//! bundle ──► EntityRegistry ──► ReferenceResolver ──► ConsistencyValidator
//!                 │                    │
//!                 │                    └──► validate (examples)
//!                 └──► Publisher ──► DefinitionCollector ──► components
//! ```

pub mod bundle;
pub mod checksum;
pub mod collector;
pub mod config;
pub mod consistency;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod graph;
pub mod merge;
pub mod publish;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod shape;
pub mod validate;

pub use bundle::{BundleEntity, EntityBundle};
pub use checksum::Checksum;
pub use collector::{CollectorOptions, DefinitionCollector, DefinitionsTable};
pub use config::SchemaConfig;
pub use consistency::{is_consistent, ConsistencyOptions, ConsistencyValidator};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use entity::{EntityDescriptor, Named, NilEntity, SchemaCapable, ValidationExempt};
pub use error::{FieldError, Result, SchemaError};
pub use graph::{ReferenceGraph, SchemaWalker, WalkOptions};
pub use merge::{MergeStrategy, SchemaMerger};
pub use publish::{components, published_schema, PublishOptions, Publisher};
pub use registry::{EntityLookup, EntityRegistry};
pub use resolve::{
    dereference, rewrite_for_output, ReferenceResolver, ResolverOptions, COMPONENTS_PREFIX,
    DEFINITIONS_PREFIX,
};
pub use schema::{Items, SchemaNode, SchemaOrBool, TypeDecl};
pub use shape::{FieldShape, Kind, RuntimeType, Shaped};
pub use validate::{validate, validate_example};
