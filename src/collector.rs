//! Definition Collection
//!
//! Merges named schema definitions gathered from many entities into one flat
//! table. Names are compared case-insensitively: two definitions whose names
//! differ only by case are rejected, because published references are
//! case-sensitive while the names they are drawn from may not be.
//!
//! Redefinitions under the same name are tolerated when their canonical forms
//! (top-level `examples` removed) are identical. The copy that carries
//! examples is kept.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeMap;

use crate::checksum::Checksum;
use crate::error::{Result, SchemaError};
use crate::schema::SchemaNode;

/// Collector settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorOptions {
    /// Drop each entry's nested `definitions` on finalize; they have already
    /// been flattened into the table
    pub strip_nested_definitions: bool,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            strip_nested_definitions: true,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    schema: SchemaNode,
    checksum: Checksum,
}

/// Accumulates definitions; callers must serialize `add` calls
#[derive(Debug, Clone, Default)]
pub struct DefinitionCollector {
    /// Keyed by lowercased name
    entries: BTreeMap<String, Entry>,
    options: CollectorOptions,
}

impl DefinitionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CollectorOptions) -> Self {
        Self {
            entries: BTreeMap::new(),
            options,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored definition under exactly `name`
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.entries
            .get(&name.to_lowercase())
            .filter(|entry| entry.name == name)
            .map(|entry| &entry.schema)
    }

    /// Add a definition and, recursively, every definition nested in it
    pub fn add(&mut self, name: &str, schema: SchemaNode) -> Result<()> {
        if name.is_empty() {
            return Err(SchemaError::EmptyDefinitionName);
        }

        let key = name.to_lowercase();
        let checksum = schema.canonical_checksum()?;

        if let Some(existing) = self.entries.get(&key) {
            if existing.name != name {
                return Err(SchemaError::CaseInsensitiveCollision {
                    existing_name: existing.name.clone(),
                    new_name: name.to_string(),
                });
            }

            if existing.checksum != checksum {
                let diff = render_diff(&existing.schema, &schema)?;
                tracing::debug!(definition = %name, "conflicting definition:\n{}", diff);
                return Err(SchemaError::ConflictingDefinition {
                    name: name.to_string(),
                    diff,
                });
            }

            if existing.schema.has_examples() || !schema.has_examples() {
                tracing::trace!(definition = %name, checksum = %checksum.short(), "identical definition");
                return Ok(());
            }

            tracing::debug!(definition = %name, "replacing definition with example-carrying copy");
        }

        let nested: Vec<(String, SchemaNode)> = schema
            .definitions
            .iter()
            .filter_map(|(n, d)| d.as_schema().map(|s| (n.clone(), s.clone())))
            .collect();

        self.entries.insert(
            key,
            Entry {
                name: name.to_string(),
                schema,
                checksum,
            },
        );

        for (nested_name, nested_schema) in nested {
            self.add(&nested_name, nested_schema)?;
        }
        Ok(())
    }

    /// Commit the collected definitions
    pub fn finalize(self) -> DefinitionsTable {
        let strip = self.options.strip_nested_definitions;
        let definitions = self
            .entries
            .into_values()
            .map(|mut entry| {
                if strip {
                    entry.schema.definitions.clear();
                }
                (entry.name, entry.schema)
            })
            .collect();
        DefinitionsTable { definitions }
    }
}

fn render_diff(existing: &SchemaNode, new: &SchemaNode) -> Result<String> {
    let old_text = serde_json::to_string_pretty(&existing.canonical())?;
    let new_text = serde_json::to_string_pretty(&new.canonical())?;

    let diff = TextDiff::from_lines(&old_text, &new_text);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(sign);
        out.push_str(change.value());
        if !change.value().ends_with('\n') {
            out.push('\n');
        }
    }
    Ok(out)
}

// =============================================================================
// Definitions Table
// =============================================================================

/// Finalized definitions, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionsTable {
    definitions: BTreeMap<String, SchemaNode>,
}

impl DefinitionsTable {
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.definitions.get(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.definitions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> BTreeMap<String, SchemaNode> {
        self.definitions
    }

    /// `{"components": {"schemas": {...}}}`
    pub fn to_components(&self) -> Result<Value> {
        let mut schemas = Map::new();
        for (name, schema) in &self.definitions {
            schemas.insert(name.clone(), schema.to_value()?);
        }
        Ok(serde_json::json!({ "components": { "schemas": schemas } }))
    }
}
