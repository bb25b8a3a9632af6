//! Publishing
//!
//! Produces the outward-facing form of registered entities: each schema
//! carries its example under `examples` and references use the components
//! prefix. [`components`] gathers every published entity, and every
//! definition nested in one, into a single definitions table.

use crate::collector::{CollectorOptions, DefinitionCollector, DefinitionsTable};
use crate::entity::{EntityDescriptor, NilEntity};
use crate::error::{Result, SchemaError};
use crate::graph::SchemaWalker;
use crate::registry::EntityRegistry;
use crate::resolve::{rewrite_for_output_with, COMPONENTS_PREFIX, DEFINITIONS_PREFIX};
use crate::schema::SchemaNode;

/// Prefixes used when publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    pub definitions_prefix: String,
    pub output_prefix: String,
    pub collector: CollectorOptions,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            definitions_prefix: DEFINITIONS_PREFIX.to_string(),
            output_prefix: COMPONENTS_PREFIX.to_string(),
            collector: CollectorOptions::default(),
        }
    }
}

/// Published schema of one entity with default prefixes
pub fn published_schema(entity: &EntityDescriptor) -> Result<SchemaNode> {
    Publisher::default().schema(entity)
}

/// Definitions table for the named entities, or every entity when `names` is `None`
pub fn components(registry: &EntityRegistry, names: Option<&[String]>) -> Result<DefinitionsTable> {
    Publisher::default().components(registry, names)
}

/// Publishes entities with explicit options
#[derive(Debug, Clone, Default)]
pub struct Publisher {
    options: PublishOptions,
    walker: SchemaWalker,
}

impl Publisher {
    pub fn new(options: PublishOptions, walker: SchemaWalker) -> Self {
        Self { options, walker }
    }

    /// Schema with example attached and references rewritten
    pub fn schema(&self, entity: &EntityDescriptor) -> Result<SchemaNode> {
        let mut schema = entity.parse_schema()?;
        if let Some(example) = entity.example_value()? {
            schema.examples = vec![example];
        }
        self.rewrite_nested(&mut schema)?;
        Ok(schema)
    }

    // The walker only reaches the root's own definitions; anything nested
    // deeper is rewritten here before the collector flattens it.
    fn rewrite_nested(&self, schema: &mut SchemaNode) -> Result<()> {
        rewrite_for_output_with(
            &self.walker,
            schema,
            &self.options.definitions_prefix,
            &self.options.output_prefix,
        )?;
        for definition in schema.definitions.values_mut() {
            if let Some(nested) = definition.as_schema_mut() {
                self.rewrite_nested(nested)?;
            }
        }
        Ok(())
    }

    /// Collect published schemas into one table
    ///
    /// The nil entity and entities without a schema are skipped.
    pub fn components(&self, registry: &EntityRegistry, names: Option<&[String]>) -> Result<DefinitionsTable> {
        let descriptors = match names {
            Some(names) => names
                .iter()
                .map(|name| {
                    registry
                        .get(name)
                        .ok_or_else(|| SchemaError::UnresolvedReference {
                            identifier: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>>>()?,
            None => registry.descriptors(),
        };

        let mut collector = DefinitionCollector::with_options(self.options.collector.clone());
        for descriptor in descriptors {
            if descriptor.name == NilEntity::NAME || !descriptor.is_schema_capable() {
                tracing::debug!(entity = %descriptor.name, "skipped while collecting components");
                continue;
            }
            collector.add(&descriptor.name, self.schema(&descriptor)?)?;
        }

        tracing::info!(definitions = collector.len(), "collected components");
        Ok(collector.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> EntityRegistry {
        let registry = EntityRegistry::new();
        registry.register_entity(&NilEntity);
        registry.register(EntityDescriptor::new(
            "Order",
            r##"{"type":"object","properties":{"item":{"$ref":"#/definitions/Item"}},"definitions":{"Item":{"type":"object","properties":{"sku":{"$ref":"#/definitions/Sku"}},"definitions":{"Sku":{"type":"string"}}}}}"##,
            r#"{"item":{"sku":"A-1"}}"#,
        ));
        registry.register(EntityDescriptor::new(
            "Health",
            r#"{"type":"object","properties":{"ok":{"type":"boolean"}}}"#,
            "",
        ));
        registry.register(EntityDescriptor::without_schema("Opaque"));
        registry
    }

    #[test]
    fn test_published_schema_attaches_example() {
        let order = registry().get("Order").unwrap();
        let schema = published_schema(&order).unwrap();
        assert_eq!(schema.examples, vec![json!({"item": {"sku": "A-1"}})]);
        assert_eq!(
            schema.properties["item"].as_schema().unwrap().reference.as_deref(),
            Some("#/components/schemas/Item")
        );
    }

    #[test]
    fn test_published_schema_rewrites_nested_definitions() {
        let order = registry().get("Order").unwrap();
        let schema = published_schema(&order).unwrap();
        let item = schema.definitions["Item"].as_schema().unwrap();
        let sku = item.properties["sku"].as_schema().unwrap();
        assert_eq!(sku.reference.as_deref(), Some("#/components/schemas/Sku"));
    }

    #[test]
    fn test_components_flattens_and_skips() {
        let table = components(&registry(), None).unwrap();
        assert_eq!(
            table.names().collect::<Vec<_>>(),
            vec!["Health", "Item", "Order", "Sku"]
        );
        assert!(table.get("Health").unwrap().examples.is_empty());
        assert!(table.get(NilEntity::NAME).is_none());
        assert!(table.iter().all(|(_, schema)| schema.definitions.is_empty()));
    }

    #[test]
    fn test_components_selected_names() {
        let names = vec!["Health".to_string()];
        let table = components(&registry(), Some(&names)).unwrap();
        assert_eq!(table.len(), 1);

        let names = vec!["Missing".to_string()];
        assert!(matches!(
            components(&registry(), Some(&names)),
            Err(SchemaError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn test_components_boolean_definitions_ignored() {
        let registry = EntityRegistry::new();
        registry.register(EntityDescriptor::new(
            "Loose",
            r#"{"type":"object","definitions":{"Anything":true}}"#,
            "{}",
        ));
        let table = components(&registry, None).unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["Loose"]);
    }
}
