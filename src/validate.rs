//! Example Validation
//!
//! Checks request/response bodies, and each entity's own example, against a
//! JSON-Schema document. Failures are reported as [`FieldError`]s sorted by
//! message so output is stable across runs.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::entity::EntityDescriptor;
use crate::error::{FieldError, Result, SchemaError};
use crate::registry::EntityLookup;
use crate::resolve::{ReferenceResolver, ResolverOptions};

/// Validate `body` against `schema`
///
/// `name` labels the schema in errors. An empty or whitespace-only body is
/// rejected without consulting the schema.
pub fn validate(name: &str, schema: &Value, body: &[u8]) -> Result<()> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(SchemaError::ExampleInvalid {
            name: name.to_string(),
            errors: vec![FieldError {
                field: String::new(),
                message: "body is empty".to_string(),
            }],
        });
    }

    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema)
        .map_err(|e| SchemaError::InvalidSchema {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

    let instance: Value = serde_json::from_slice(body)?;
    let mut errors: Vec<FieldError> = match compiled.validate(&instance) {
        Ok(()) => return Ok(()),
        Err(failures) => failures
            .map(|e| FieldError {
                field: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect(),
    };
    errors.sort_by(|a, b| a.message.cmp(&b.message).then_with(|| a.field.cmp(&b.field)));

    tracing::debug!(schema = %name, failures = errors.len(), "body failed validation");
    Err(SchemaError::ExampleInvalid {
        name: name.to_string(),
        errors,
    })
}

/// Validate an entity's example against its fully dereferenced schema
pub fn validate_example(entity: &EntityDescriptor, registry: &dyn EntityLookup) -> Result<()> {
    validate_example_with(entity, registry, ResolverOptions::default())
}

/// [`validate_example`] with explicit resolver options
pub fn validate_example_with(
    entity: &EntityDescriptor,
    registry: &dyn EntityLookup,
    options: ResolverOptions,
) -> Result<()> {
    let resolver = ReferenceResolver::with_options(registry, options);
    let schema = resolver.dereference_transitive(entity.parse_schema()?)?;
    validate(&entity.name, &schema.to_value()?, &entity.example)
}
