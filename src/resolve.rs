//! Reference Resolution
//!
//! `dereference` makes a schema self-contained by inlining every entity it
//! references from the registry under its local `definitions`. References
//! already satisfied by the document's own definitions are left alone. An
//! inlined entity's own `definitions` are also copied into the root table:
//! once inlined, its local references resolve against the document root.
//!
//! `rewrite_for_output` converts reference tokens between prefix conventions,
//! e.g. from `#/definitions/` to the published `#/components/schemas/`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SchemaError};
use crate::graph::{SchemaWalker, WalkOptions};
use crate::registry::EntityLookup;
use crate::schema::{SchemaNode, SchemaOrBool};

/// Prefix of references into a document's own definitions
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Prefix of references in published documents
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

const KNOWN_PREFIXES: [&str; 2] = [DEFINITIONS_PREFIX, COMPONENTS_PREFIX];

/// Resolver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    /// Prefix stripped from reference tokens to obtain an entity name
    pub definitions_prefix: String,
    pub walk: WalkOptions,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            definitions_prefix: DEFINITIONS_PREFIX.to_string(),
            walk: WalkOptions::default(),
        }
    }
}

/// Resolves external references against an entity registry
pub struct ReferenceResolver<'r> {
    registry: &'r dyn EntityLookup,
    options: ResolverOptions,
    walker: SchemaWalker,
}

impl<'r> ReferenceResolver<'r> {
    pub fn new(registry: &'r dyn EntityLookup) -> Self {
        Self::with_options(registry, ResolverOptions::default())
    }

    pub fn with_options(registry: &'r dyn EntityLookup, options: ResolverOptions) -> Self {
        let walker = SchemaWalker::new(options.walk);
        Self {
            registry,
            options,
            walker,
        }
    }

    /// Inline every directly referenced registry entity
    ///
    /// Inlined schemas are not themselves resolved; see
    /// [`dereference_transitive`](Self::dereference_transitive).
    pub fn dereference(&self, mut schema: SchemaNode) -> Result<SchemaNode> {
        for token in self.walker.collect_refs(&schema)? {
            let identifier = entity_identifier(&token, &self.options.definitions_prefix);

            if schema.definitions.contains_key(identifier) {
                continue;
            }

            let entity = self
                .registry
                .lookup(identifier)
                .ok_or_else(|| SchemaError::UnresolvedReference {
                    identifier: identifier.to_string(),
                })?;

            let inlined = match &entity.schema {
                Some(bytes) => SchemaNode::parse_named(identifier, bytes)?,
                None => {
                    return Err(SchemaError::NotSchemaCapable {
                        identifier: identifier.to_string(),
                    })
                }
            };

            tracing::debug!(definition = %identifier, "inlined registry entity");
            hoist_definitions(&mut schema.definitions, identifier, inlined);
        }

        Ok(schema)
    }

    /// Byte-oriented form of [`dereference`](Self::dereference)
    pub fn dereference_bytes(&self, schema: &[u8]) -> Result<Vec<u8>> {
        let parsed = SchemaNode::parse(schema)?;
        self.dereference(parsed)?.to_bytes()
    }

    /// Repeat `dereference` until no new definitions are inlined
    ///
    /// Each pass adds at least one registry entity, so this terminates once
    /// every reachable entity has been inlined.
    pub fn dereference_transitive(&self, mut schema: SchemaNode) -> Result<SchemaNode> {
        let mut passes = 0;
        loop {
            let before = schema.definitions.len();
            schema = self.dereference(schema)?;
            passes += 1;
            if schema.definitions.len() == before {
                tracing::trace!(passes, "dereference reached fixpoint");
                return Ok(schema);
            }
        }
    }
}

/// Insert `inlined` under `name` and copy its nested definitions, at any
/// depth, into the same table. The inlined entry stays as registered. Names
/// already present are kept.
fn hoist_definitions(table: &mut BTreeMap<String, SchemaOrBool>, name: &str, inlined: SchemaNode) {
    let nested = inlined.definitions.clone();
    table.insert(name.to_string(), inlined.into());

    for (nested_name, definition) in nested {
        if table.contains_key(&nested_name) {
            tracing::debug!(definition = %nested_name, owner = %name, "nested definition already present");
            continue;
        }
        match definition {
            SchemaOrBool::Schema(node) => hoist_definitions(table, &nested_name, *node),
            SchemaOrBool::Bool(_) => {
                table.insert(nested_name, definition);
            }
        }
    }
}

/// Inline directly referenced entities using default options
pub fn dereference(schema: SchemaNode, registry: &dyn EntityLookup) -> Result<SchemaNode> {
    ReferenceResolver::new(registry).dereference(schema)
}

/// Entity name a reference token resolves to
///
/// `definitions_prefix` is stripped; a token without it names the entity
/// whole. The resolver and the reference graph share this rule.
pub fn entity_identifier<'t>(token: &'t str, definitions_prefix: &str) -> &'t str {
    token.strip_prefix(definitions_prefix).unwrap_or(token)
}

/// Identifier named by a reference token, for prefix rewriting
///
/// Any of `prefixes` or a known prefix is stripped; tokens with no recognized
/// prefix yield the text after the last `/`.
pub fn ref_identifier<'t>(token: &'t str, prefixes: &[&str]) -> &'t str {
    prefixes
        .iter()
        .chain(KNOWN_PREFIXES.iter())
        .filter(|prefix| !prefix.is_empty())
        .find_map(|prefix| token.strip_prefix(*prefix))
        .unwrap_or_else(|| token.rsplit('/').next().unwrap_or(token))
}

fn rewrite_token(token: &str, from: &str, to: &str) -> String {
    format!("{}{}", to, ref_identifier(token, &[from, to]))
}

/// Replace the prefix of every reference token
pub fn rewrite_for_output(schema: &mut SchemaNode, from: &str, to: &str) -> Result<()> {
    rewrite_for_output_with(&SchemaWalker::default(), schema, from, to)
}

/// [`rewrite_for_output`] with an explicit walker
pub fn rewrite_for_output_with(walker: &SchemaWalker, schema: &mut SchemaNode, from: &str, to: &str) -> Result<()> {
    walker.for_each_ref_mut(schema, |token| {
        let rewritten = rewrite_token(token, from, to);
        tracing::trace!(from = %token, to = %rewritten, "rewrote reference");
        *token = rewritten;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityDescriptor;
    use crate::registry::EntityRegistry;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn node(value: serde_json::Value) -> SchemaNode {
        SchemaNode::from_value(value).unwrap()
    }

    fn registry() -> EntityRegistry {
        let registry = EntityRegistry::new();
        registry.register(EntityDescriptor::new(
            "Health",
            r#"{"type":"object","properties":{"status":{"type":"string"}}}"#,
            r#"{"status":"ok"}"#,
        ));
        registry.register(EntityDescriptor::new(
            "Report",
            r##"{"type":"object","properties":{"health":{"$ref":"#/definitions/Health"}}}"##,
            "{}",
        ));
        registry.register(EntityDescriptor::without_schema("Opaque"));
        registry
    }

    #[test]
    fn test_no_refs_is_identity() {
        let schema = node(json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "definitions": {"Local": {"type": "integer"}}
        }));
        let empty: HashMap<String, Arc<EntityDescriptor>> = HashMap::new();
        assert_eq!(dereference(schema.clone(), &empty).unwrap(), schema);
        assert_eq!(dereference(schema.clone(), &registry()).unwrap(), schema);
    }

    #[test]
    fn test_inlines_registry_entity() {
        let registry = registry();
        let schema = node(json!({"properties": {"h": {"$ref": "#/definitions/Health"}}}));

        let resolved = dereference(schema, &registry).unwrap();
        let expected = registry.get("Health").unwrap().parse_schema().unwrap();
        assert_eq!(resolved.definitions["Health"].as_schema(), Some(&expected));
    }

    #[test]
    fn test_local_definition_wins() {
        let schema = node(json!({
            "properties": {"h": {"$ref": "#/definitions/Health"}},
            "definitions": {"Health": {"type": "boolean"}}
        }));
        let resolved = dereference(schema.clone(), &registry()).unwrap();
        assert_eq!(resolved, schema);
    }

    #[test]
    fn test_unresolved_reference() {
        let schema = node(json!({"items": {"$ref": "#/definitions/Missing"}}));
        let err = dereference(schema, &registry()).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedReference { identifier } if identifier == "Missing"));
    }

    #[test]
    fn test_not_schema_capable() {
        let schema = node(json!({"not": {"$ref": "#/definitions/Opaque"}}));
        let err = dereference(schema, &registry()).unwrap_err();
        assert!(matches!(err, SchemaError::NotSchemaCapable { identifier } if identifier == "Opaque"));
    }

    #[test]
    fn test_single_pass_vs_transitive() {
        let registry = registry();
        let schema = node(json!({"properties": {"r": {"$ref": "#/definitions/Report"}}}));

        let resolver = ReferenceResolver::new(&registry);
        let once = resolver.dereference(schema.clone()).unwrap();
        assert!(once.definitions.contains_key("Report"));
        assert!(!once.definitions.contains_key("Health"));

        let full = resolver.dereference_transitive(schema).unwrap();
        assert!(full.definitions.contains_key("Report"));
        assert!(full.definitions.contains_key("Health"));
    }

    #[test]
    fn test_nested_definitions_copied_to_root() {
        let registry = registry();
        registry.register(EntityDescriptor::new(
            "Order",
            r##"{
                "type": "object",
                "properties": {"item": {"$ref": "#/definitions/Item"}},
                "definitions": {
                    "Item": {"type": "object", "properties": {"sku": {"$ref": "#/definitions/Sku"}}},
                    "Sku": {"type": "string"},
                    "Health": {"type": "boolean"}
                }
            }"##,
            "{}",
        ));

        let schema = node(json!({
            "properties": {
                "order": {"$ref": "#/definitions/Order"},
                "health": {"$ref": "#/definitions/Health"}
            },
            "definitions": {"Health": {"type": "integer"}}
        }));
        let resolved = ReferenceResolver::new(&registry).dereference_transitive(schema).unwrap();

        let order = registry.get("Order").unwrap().parse_schema().unwrap();
        assert_eq!(resolved.definitions["Order"].as_schema(), Some(&order));
        assert_eq!(resolved.definitions["Item"], order.definitions["Item"]);
        assert_eq!(resolved.definitions["Sku"], order.definitions["Sku"]);
        // the document's own definition is not replaced
        assert_eq!(resolved.definitions["Health"].as_schema(), Some(&SchemaNode::of_type("integer")));
    }

    #[test]
    fn test_dereference_bytes() {
        let registry = registry();
        let resolver = ReferenceResolver::new(&registry);
        let out = resolver
            .dereference_bytes(br##"{"$ref":"#/definitions/Health"}"##)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["definitions"]["Health"]["type"], json!("object"));
    }

    #[test]
    fn test_entity_identifier() {
        assert_eq!(entity_identifier("#/definitions/Widget", DEFINITIONS_PREFIX), "Widget");
        assert_eq!(entity_identifier("#/$defs/Widget", "#/$defs/"), "Widget");
        assert_eq!(
            entity_identifier("#/components/schemas/Widget", DEFINITIONS_PREFIX),
            "#/components/schemas/Widget"
        );
    }

    #[test]
    fn test_ref_identifier() {
        assert_eq!(ref_identifier("#/definitions/Widget", &[]), "Widget");
        assert_eq!(ref_identifier("#/components/schemas/Widget", &[]), "Widget");
        assert_eq!(ref_identifier("other.json#/things/Widget", &[]), "Widget");
        assert_eq!(ref_identifier("Widget", &[]), "Widget");
        assert_eq!(ref_identifier("#/$defs/Widget", &["#/$defs/"]), "Widget");
    }

    #[test]
    fn test_rewrite_idempotent_and_round_trip() {
        let original = node(json!({
            "properties": {
                "a": {"$ref": "#/definitions/A"},
                "b": {"items": {"$ref": "#/definitions/B"}}
            },
            "definitions": {"B": {"oneOf": [{"$ref": "#/definitions/A"}]}}
        }));

        let mut published = original.clone();
        rewrite_for_output(&mut published, DEFINITIONS_PREFIX, COMPONENTS_PREFIX).unwrap();
        let walker = SchemaWalker::default();
        assert!(walker
            .collect_refs(&published)
            .unwrap()
            .iter()
            .all(|r| r.starts_with(COMPONENTS_PREFIX)));

        let mut twice = published.clone();
        rewrite_for_output(&mut twice, DEFINITIONS_PREFIX, COMPONENTS_PREFIX).unwrap();
        assert_eq!(twice, published);

        let mut back = published;
        rewrite_for_output(&mut back, COMPONENTS_PREFIX, DEFINITIONS_PREFIX).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_rewrite_unknown_prefix() {
        let mut schema = node(json!({"$ref": "shared.json#/things/Widget"}));
        rewrite_for_output(&mut schema, DEFINITIONS_PREFIX, COMPONENTS_PREFIX).unwrap();
        assert_eq!(schema.reference.as_deref(), Some("#/components/schemas/Widget"));
    }
}
