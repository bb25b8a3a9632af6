//! Schema and Example Merging
//!
//! Combines several object schemas into one by taking the union of their
//! properties and required lists, and several examples into one by merging
//! their top-level keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, SchemaError};
use crate::schema::{SchemaNode, SchemaOrBool, TypeDecl};

/// What to do when two inputs declare the same property
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Later inputs replace earlier ones
    #[default]
    OverwriteDuplicates,
    /// Fail with `DuplicateProperty`
    ErrorOnDuplicates,
    /// The first declaration wins
    KeepExisting,
}

/// Merges object schemas and examples
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaMerger {
    strategy: MergeStrategy,
}

impl SchemaMerger {
    pub fn new(strategy: MergeStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// Union of properties and required names as a single object schema
    ///
    /// No inputs yield the empty schema.
    pub fn merge_schemas(&self, schemas: &[SchemaNode]) -> Result<SchemaNode> {
        if schemas.is_empty() {
            return Ok(SchemaNode::default());
        }

        let mut properties: BTreeMap<String, SchemaOrBool> = BTreeMap::new();
        let mut required = BTreeSet::new();

        for schema in schemas {
            for (name, property) in &schema.properties {
                match (properties.contains_key(name), self.strategy) {
                    (true, MergeStrategy::ErrorOnDuplicates) => {
                        return Err(SchemaError::DuplicateProperty {
                            property: name.clone(),
                        })
                    }
                    (true, MergeStrategy::KeepExisting) => continue,
                    _ => {
                        properties.insert(name.clone(), property.clone());
                    }
                }
            }
            required.extend(schema.required.iter().cloned());
        }

        tracing::debug!(
            inputs = schemas.len(),
            properties = properties.len(),
            "merged schemas"
        );

        Ok(SchemaNode {
            schema_type: Some(TypeDecl::Single("object".to_string())),
            properties,
            required: required.into_iter().collect(),
            ..SchemaNode::default()
        })
    }

    /// Merge example objects key by key; later inputs win
    pub fn merge_examples(&self, examples: &[Value]) -> Result<Value> {
        let mut merged = Map::new();
        for (i, example) in examples.iter().enumerate() {
            let Value::Object(fields) = example else {
                return Err(SchemaError::InvalidSchema {
                    name: format!("example {}", i),
                    reason: "expected a JSON object".to_string(),
                });
            };
            for (key, value) in fields {
                merged.insert(key.clone(), value.clone());
            }
        }
        Ok(Value::Object(merged))
    }
}
