//! Schema document model
//!
//! In-memory representation of one JSON-Schema document. Only the keywords the
//! resolver and the consistency validator reason about are modeled as fields;
//! everything else (`format`, `description`, `enum`, ...) is kept verbatim in
//! [`SchemaNode::extra`] so a parse/serialize round trip does not lose content.
//!
//! Empty collections (`properties`, `required`, `definitions`, ...) are omitted
//! on output.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::checksum::Checksum;
use crate::error::{Result, SchemaError};

/// A JSON-Schema node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// Reference token (`#/definitions/Name`)
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeDecl>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaOrBool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_items: Option<Box<SchemaOrBool>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<Box<SchemaOrBool>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaOrBool>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaOrBool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaOrBool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaOrBool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<SchemaOrBool>>,

    /// Local definitions table
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, SchemaOrBool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,

    /// Keywords not modeled above
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A schema or the boolean shorthand (`true` accepts anything, `false` nothing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrBool {
    Bool(bool),
    Schema(Box<SchemaNode>),
}

/// The three forms `items` can take
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    Bool(bool),
    Tuple(Vec<SchemaOrBool>),
    Single(Box<SchemaNode>),
}

/// The `type` keyword: one tag or a set of tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDecl {
    Single(String),
    Union(Vec<String>),
}

impl TypeDecl {
    /// All declared tags, in declaration order
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Union(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl SchemaOrBool {
    pub fn as_schema(&self) -> Option<&SchemaNode> {
        match self {
            Self::Schema(node) => Some(&**node),
            Self::Bool(_) => None,
        }
    }

    pub fn as_schema_mut(&mut self) -> Option<&mut SchemaNode> {
        match self {
            Self::Schema(node) => Some(&mut **node),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Schema(_) => None,
        }
    }
}

impl From<SchemaNode> for SchemaOrBool {
    fn from(node: SchemaNode) -> Self {
        Self::Schema(Box::new(node))
    }
}

impl SchemaNode {
    /// Parse a schema document from raw bytes
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Parse a schema document, attributing failures to a named entity
    pub fn parse_named(name: &str, bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| SchemaError::InvalidSchema {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Copy with top-level `examples` removed, used for equality comparison
    pub fn canonical(&self) -> Self {
        let mut canonical = self.clone();
        canonical.examples.clear();
        canonical
    }

    /// Checksum of the canonical form
    pub fn canonical_checksum(&self) -> Result<Checksum> {
        Ok(Checksum::from_json(&self.canonical().to_value()?))
    }

    pub fn has_examples(&self) -> bool {
        !self.examples.is_empty()
    }

    /// A node that only points elsewhere
    pub fn reference_to(token: impl Into<String>) -> Self {
        Self {
            reference: Some(token.into()),
            ..Default::default()
        }
    }

    /// A node with a single type tag
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            schema_type: Some(TypeDecl::Single(type_name.into())),
            ..Default::default()
        }
    }

    /// A node whose type is `[type_name, "null"]`
    pub fn nullable(type_name: impl Into<String>) -> Self {
        Self {
            schema_type: Some(TypeDecl::Union(vec![type_name.into(), "null".to_string()])),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, schema: SchemaNode) -> Self {
        self.properties.insert(name.into(), schema.into());
        self
    }

    pub fn with_definition(mut self, name: impl Into<String>, schema: SchemaNode) -> Self {
        self.definitions.insert(name.into(), schema.into());
        self
    }

    pub fn with_items(mut self, schema: SchemaNode) -> Self {
        self.items = Some(Items::Single(Box::new(schema)));
        self
    }

    pub fn with_additional_properties(mut self, additional: SchemaOrBool) -> Self {
        self.additional_properties = Some(Box::new(additional));
        self
    }

    /// `additionalProperties` as a boolean, when given in that form
    pub fn additional_properties_flag(&self) -> Option<bool> {
        self.additional_properties.as_deref().and_then(SchemaOrBool::as_bool)
    }
}
