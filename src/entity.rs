//! Entities
//!
//! An entity is a named logical type that carries its own schema document and
//! example. Capabilities are expressed through a small set of traits; the
//! registry stores entities as [`EntityDescriptor`] values.

use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::schema::SchemaNode;
use crate::shape::{RuntimeType, Shaped};

/// Anything with a registry name
pub trait Named {
    fn name(&self) -> String;
}

/// An entity that can supply its schema document and an example
pub trait SchemaCapable: Named {
    /// Raw JSON-Schema document
    fn schema(&self) -> Vec<u8>;

    /// Raw JSON example
    fn example(&self) -> Vec<u8>;
}

/// Skip hook consulted before a value's subtree is checked for consistency
pub trait ValidationExempt {
    fn should_skip_schema_validation(&self) -> bool;
}

/// A registered entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    pub name: String,
    /// Raw schema document; `None` when the entity cannot supply one
    pub schema: Option<Vec<u8>>,
    pub example: Vec<u8>,
    /// Runtime shape used by the consistency validator
    pub shape: Option<RuntimeType>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>, schema: impl Into<Vec<u8>>, example: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema.into()),
            example: example.into(),
            shape: None,
        }
    }

    /// An entity known to the registry that has no schema
    pub fn without_schema(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            example: Vec::new(),
            shape: None,
        }
    }

    pub fn from_entity<E: SchemaCapable + ?Sized>(entity: &E) -> Self {
        Self::new(entity.name(), entity.schema(), entity.example())
    }

    /// Descriptor including the entity's runtime shape
    pub fn from_shaped<E: SchemaCapable + Shaped>(entity: &E) -> Self {
        let name = entity.name();
        let shape = E::runtime_type().entity(name.clone());
        Self::from_entity(entity).with_shape(shape)
    }

    pub fn with_shape(mut self, shape: RuntimeType) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn is_schema_capable(&self) -> bool {
        self.schema.is_some()
    }

    /// Parse the schema document
    pub fn parse_schema(&self) -> Result<SchemaNode> {
        match &self.schema {
            Some(bytes) => SchemaNode::parse_named(&self.name, bytes),
            None => Err(SchemaError::NotSchemaCapable {
                identifier: self.name.clone(),
            }),
        }
    }

    /// Parse the example; `None` when the example is empty
    pub fn example_value(&self) -> Result<Option<Value>> {
        if self.example.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&self.example)?))
    }
}

// =============================================================================
// NilEntity
// =============================================================================

/// Entity describing an empty object body
#[derive(Debug, Clone, Copy, Default)]
pub struct NilEntity;

impl NilEntity {
    pub const NAME: &'static str = "NilEntity";
    const SCHEMA: &'static str =
        r#"{"type":"object","properties":{},"additionalProperties":false,"required":[]}"#;
}

impl Named for NilEntity {
    fn name(&self) -> String {
        Self::NAME.to_string()
    }
}

impl SchemaCapable for NilEntity {
    fn schema(&self) -> Vec<u8> {
        Self::SCHEMA.as_bytes().to_vec()
    }

    fn example(&self) -> Vec<u8> {
        b"{}".to_vec()
    }
}

impl Shaped for NilEntity {
    fn runtime_type() -> RuntimeType {
        RuntimeType::object(Vec::new())
    }
}
