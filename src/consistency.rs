//! Struct/Schema Consistency
//!
//! Checks that a [`RuntimeType`] and a dereferenced [`SchemaNode`] describe the
//! same data shape. Both trees are descended in parallel and the first mismatch
//! is returned; callers fix it and re-run to find the next one.
//!
//! Breadcrumbs start at the root name and grow with `.field` for struct
//! fields, `[key]` for map values and `.0` for array elements, e.g.
//! `Widget.parts.0.name`.
//!
//! `$ref` nodes are looked up in the root schema's `definitions`, so schemas
//! that reference registry entities must be dereferenced first (see
//! [`ConsistencyValidator::check_entity`]).

use serde::{Deserialize, Serialize};

use crate::entity::EntityDescriptor;
use crate::error::{Result, SchemaError};
use crate::graph::{WalkOptions, DEFAULT_MAX_DEPTH};
use crate::registry::EntityLookup;
use crate::resolve::{ReferenceResolver, ResolverOptions, DEFINITIONS_PREFIX};
use crate::schema::{Items, SchemaNode, SchemaOrBool, TypeDecl};
use crate::shape::{FieldShape, Kind, RuntimeType};

/// Validator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyOptions {
    /// Wire names that may be absent from a struct's schema because the server
    /// assigns them
    pub server_defined_fields: Vec<String>,
    /// Prefix every `$ref` must carry
    pub definitions_prefix: String,
    pub max_depth: usize,
    /// Accept a nullable schema for a value that is always present
    #[serde(default)]
    pub allow_nullable_required: bool,
}

impl Default for ConsistencyOptions {
    fn default() -> Self {
        Self {
            server_defined_fields: vec!["id".to_string()],
            definitions_prefix: DEFINITIONS_PREFIX.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            allow_nullable_required: false,
        }
    }
}

/// Compares runtime shapes against schemas
#[derive(Debug, Clone, Default)]
pub struct ConsistencyValidator {
    options: ConsistencyOptions,
}

/// Check with default options
pub fn is_consistent(schema: &SchemaNode, shape: &RuntimeType, root_name: &str) -> Result<()> {
    ConsistencyValidator::default().check(schema, shape, root_name)
}

impl ConsistencyValidator {
    pub fn new(options: ConsistencyOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConsistencyOptions {
        &self.options
    }

    /// Check `shape` against an already dereferenced `schema`
    pub fn check(&self, schema: &SchemaNode, shape: &RuntimeType, root_name: &str) -> Result<()> {
        let pass = Pass {
            root: schema,
            options: &self.options,
        };
        pass.traverse(Some(schema), shape, Position::root(root_name))
    }

    /// Dereference an entity's schema against `registry` and check it against
    /// the entity's runtime shape
    pub fn check_entity(&self, entity: &EntityDescriptor, registry: &dyn EntityLookup) -> Result<()> {
        let shape = entity.shape.as_ref().ok_or_else(|| SchemaError::MissingRuntimeShape {
            name: entity.name.clone(),
        })?;

        let options = ResolverOptions {
            definitions_prefix: self.options.definitions_prefix.clone(),
            walk: WalkOptions {
                max_depth: self.options.max_depth,
            },
        };
        let schema = ReferenceResolver::with_options(registry, options)
            .dereference_transitive(entity.parse_schema()?)?;

        tracing::debug!(entity = %entity.name, "checking struct/schema consistency");
        self.check(&schema, shape, &entity.name)
    }
}

// =============================================================================
// Traversal
// =============================================================================

#[derive(Debug, Clone)]
struct Position {
    breadcrumb: String,
    depth: usize,
    is_root: bool,
    skip_when_empty: bool,
}

impl Position {
    fn root(name: &str) -> Self {
        Self {
            breadcrumb: name.to_string(),
            depth: 0,
            is_root: true,
            skip_when_empty: false,
        }
    }

    fn child(&self, suffix: &str, skip_when_empty: bool) -> Self {
        Self {
            breadcrumb: format!("{}{}", self.breadcrumb, suffix),
            depth: self.depth + 1,
            is_root: false,
            skip_when_empty,
        }
    }
}

struct Pass<'a> {
    root: &'a SchemaNode,
    options: &'a ConsistencyOptions,
}

impl<'a> Pass<'a> {
    fn traverse(&self, schema: Option<&'a SchemaNode>, shape: &RuntimeType, pos: Position) -> Result<()> {
        if shape.exempt {
            return Ok(());
        }
        if pos.depth > self.options.max_depth {
            return Err(SchemaError::DepthLimitExceeded {
                breadcrumb: pos.breadcrumb,
                limit: self.options.max_depth,
            });
        }

        let Some(schema) = schema else {
            if shape.kind == Kind::Opaque {
                return Ok(());
            }
            return Err(SchemaError::InterfaceWithoutSchema {
                breadcrumb: pos.breadcrumb,
            });
        };

        let (schema, nullable_ref) = self.ensure_dereferenced(schema, &pos)?;
        let (type_name, nullable_type) = type_of(schema, &pos)?;
        let nullable = nullable_ref || nullable_type;

        // Below the root nullability must agree both ways. Entities and
        // omittable fields are exempt; opaque values may always be null.
        let may_be_absent = shape.optional || matches!(shape.kind, Kind::Map { .. });
        let exempt_position = pos.is_root || shape.is_entity() || pos.skip_when_empty;
        if !exempt_position && may_be_absent && !nullable {
            return Err(SchemaError::NotNullable {
                breadcrumb: pos.breadcrumb,
            });
        }
        if !exempt_position
            && nullable
            && !may_be_absent
            && shape.kind != Kind::Opaque
            && !self.options.allow_nullable_required
        {
            return Err(SchemaError::NotNullable {
                breadcrumb: pos.breadcrumb,
            });
        }

        if shape.kind == Kind::Opaque {
            return Ok(());
        }

        match type_name {
            "boolean" => expect_kind(matches!(shape.kind, Kind::Boolean), "boolean", shape, &pos),
            "integer" => expect_kind(matches!(shape.kind, Kind::Integer), "integer", shape, &pos),
            "number" => expect_kind(
                matches!(shape.kind, Kind::Integer | Kind::Number),
                "number",
                shape,
                &pos,
            ),
            "string" => expect_kind(
                matches!(shape.kind, Kind::String | Kind::Bytes | Kind::Timestamp),
                "string",
                shape,
                &pos,
            ),
            "object" => match &shape.kind {
                Kind::Object { fields } => self.check_struct(schema, fields, &pos),
                Kind::Map { value } => self.check_map(schema, value, &pos),
                _ => Err(mismatch("map or struct", shape, &pos)),
            },
            "array" => match &shape.kind {
                Kind::Array { element } => self.check_array(schema, element, &pos),
                _ => Err(mismatch("array", shape, &pos)),
            },
            other => Err(SchemaError::UnknownType {
                breadcrumb: pos.breadcrumb,
                type_name: other.to_string(),
            }),
        }
    }

    /// Follow a `$ref` into the root definitions, or unwrap the
    /// `oneOf: [{type: null}, {$ref}]` nullable reference idiom
    fn ensure_dereferenced(&self, schema: &'a SchemaNode, pos: &Position) -> Result<(&'a SchemaNode, bool)> {
        if let Some(token) = &schema.reference {
            let prefix = self.options.definitions_prefix.as_str();
            let key = token
                .strip_prefix(prefix)
                .ok_or_else(|| SchemaError::InvalidReference {
                    breadcrumb: pos.breadcrumb.clone(),
                    reference: token.clone(),
                    expected_prefix: prefix.to_string(),
                })?;

            return match self.root.definitions.get(key).and_then(SchemaOrBool::as_schema) {
                Some(target) => Ok((target, false)),
                None => Err(SchemaError::UnresolvedReference {
                    identifier: key.to_string(),
                }),
            };
        }

        let mut inner = schema;
        let mut nullable = false;
        for member in schema.one_of.iter().filter_map(SchemaOrBool::as_schema) {
            if is_null_type(member) {
                nullable = true;
            } else if member.reference.is_some() {
                let (target, nullable_ref) = self.ensure_dereferenced(member, pos)?;
                inner = target;
                nullable = nullable || nullable_ref;
            }
        }
        Ok((inner, nullable))
    }

    fn check_struct(&self, schema: &'a SchemaNode, fields: &[FieldShape], pos: &Position) -> Result<()> {
        for field in fields {
            if field.wire_name.is_empty() {
                return Err(SchemaError::EmptyWireName {
                    breadcrumb: pos.breadcrumb.clone(),
                    declared_name: field.declared_name.clone(),
                });
            }

            let property = schema.properties.get(&field.wire_name);
            if property.is_none() && !self.is_server_defined(&field.wire_name) {
                return Err(SchemaError::MissingPropertyInSchema {
                    breadcrumb: pos.breadcrumb.clone(),
                    property: field.wire_name.clone(),
                });
            }

            if schema.additional_properties_flag() == Some(true) {
                return Err(SchemaError::OpenStructSchema {
                    breadcrumb: pos.breadcrumb.clone(),
                });
            }

            // Boolean property schemas place no structural constraint
            let Some(property) = property.and_then(SchemaOrBool::as_schema) else {
                continue;
            };

            let child = pos.child(&format!(".{}", field.wire_name), field.skip_when_empty);
            self.traverse(Some(property), &field.ty, child)?;
        }

        for name in schema.properties.keys() {
            if !fields.iter().any(|f| &f.wire_name == name) {
                return Err(SchemaError::AdditionalProperty {
                    breadcrumb: pos.breadcrumb.clone(),
                    property: name.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_map(&self, schema: &'a SchemaNode, value: &RuntimeType, pos: &Position) -> Result<()> {
        if schema.additional_properties_flag() == Some(false) {
            return Err(SchemaError::StrictMapMismatch {
                breadcrumb: pos.breadcrumb.clone(),
            });
        }

        let value_pos = pos.child("[key]", false);
        if let Some(additional) = schema.additional_properties.as_deref().and_then(SchemaOrBool::as_schema) {
            self.traverse(Some(additional), value, value_pos.clone())?;
        }
        for (name, property) in &schema.properties {
            let child = value_pos.child(&format!(".{}", name), false);
            self.traverse(property.as_schema(), value, child)?;
        }
        Ok(())
    }

    fn check_array(&self, schema: &'a SchemaNode, element: &RuntimeType, pos: &Position) -> Result<()> {
        for alternatives in [&schema.all_of, &schema.one_of, &schema.any_of] {
            for (i, alternative) in alternatives.iter().enumerate() {
                let child = pos.child(&format!(".{}", i), false);
                self.traverse(alternative.as_schema(), element, child)?;
            }
        }

        let items = match &schema.items {
            Some(Items::Single(node)) => Some(Some(&**node)),
            Some(Items::Tuple(list)) => list.first().map(SchemaOrBool::as_schema),
            Some(Items::Bool(_)) => Some(None),
            None => None,
        };
        if let Some(items) = items {
            self.traverse(items, element, pos.child(".0", false))?;
        }
        Ok(())
    }

    fn is_server_defined(&self, wire_name: &str) -> bool {
        self.options.server_defined_fields.iter().any(|f| f == wire_name)
    }
}

/// Extract the single non-null type tag and whether `null` is allowed
fn type_of<'s>(schema: &'s SchemaNode, pos: &Position) -> Result<(&'s str, bool)> {
    let Some(decl) = &schema.schema_type else {
        return Err(SchemaError::MissingType {
            breadcrumb: pos.breadcrumb.clone(),
        });
    };

    let names = decl.names();
    let nullable = names.contains(&"null");
    let concrete: Vec<&str> = names.iter().copied().filter(|n| *n != "null").collect();

    match concrete.as_slice() {
        [single] => Ok((*single, nullable)),
        [] if nullable => Ok(("null", false)),
        [] => Err(SchemaError::MissingType {
            breadcrumb: pos.breadcrumb.clone(),
        }),
        _ => Err(SchemaError::UnsupportedTypeUnion {
            breadcrumb: pos.breadcrumb.clone(),
            types: names.iter().map(|n| n.to_string()).collect(),
        }),
    }
}

fn is_null_type(schema: &SchemaNode) -> bool {
    matches!(&schema.schema_type, Some(TypeDecl::Single(t)) if t == "null")
}

fn mismatch(expected: &str, shape: &RuntimeType, pos: &Position) -> SchemaError {
    SchemaError::SchemaTypeMismatch {
        expected: expected.to_string(),
        got: shape.kind.name().to_string(),
        breadcrumb: pos.breadcrumb.clone(),
    }
}

fn expect_kind(ok: bool, expected: &str, shape: &RuntimeType, pos: &Position) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(mismatch(expected, shape, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{FieldShape, Shaped};
    use serde_json::json;

    fn node(value: serde_json::Value) -> SchemaNode {
        SchemaNode::from_value(value).unwrap()
    }

    /// count: Option<i64>, discarded_at: Option<DateTime>, omittable: String (skip when empty)
    fn test_model() -> RuntimeType {
        RuntimeType::object(vec![
            FieldShape::new("count", Option::<i64>::runtime_type()),
            FieldShape::new("discarded_at", Option::<chrono::DateTime<chrono::Utc>>::runtime_type()),
            FieldShape::new("omittable", String::runtime_type()).skip_when_empty(),
        ])
    }

    fn model_schema(count: serde_json::Value) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "count": count,
                "discarded_at": {"type": ["string", "null"], "format": "date-time"},
                "omittable": {"type": "string"}
            },
            "required": ["count", "discarded_at"]
        })
    }

    #[test]
    fn test_valid_schema() {
        let schema = node(model_schema(json!({"type": ["integer", "null"]})));
        is_consistent(&schema, &test_model(), "TestCase").unwrap();
    }

    #[test]
    fn test_not_nullable() {
        let schema = node(model_schema(json!({"type": ["integer"]})));
        let err = is_consistent(&schema, &test_model(), "TestCase").unwrap_err();
        assert!(matches!(err, SchemaError::NotNullable { ref breadcrumb } if breadcrumb == "TestCase.count"));
    }

    #[test]
    fn test_nullable_schema_for_required_value() {
        let shape = RuntimeType::object(vec![
            FieldShape::new("count", i64::runtime_type()),
            FieldShape::new("payload", serde_json::Value::runtime_type()),
            FieldShape::new("omittable", String::runtime_type()).skip_when_empty(),
        ]);
        let schema = node(json!({
            "type": "object",
            "properties": {
                "count": {"type": ["integer", "null"]},
                "payload": {"type": ["object", "null"]},
                "omittable": {"type": ["string", "null"]}
            }
        }));
        let err = is_consistent(&schema, &shape, "TestCase").unwrap_err();
        assert!(matches!(err, SchemaError::NotNullable { ref breadcrumb } if breadcrumb == "TestCase.count"));

        let lenient = ConsistencyValidator::new(ConsistencyOptions {
            allow_nullable_required: true,
            ..Default::default()
        });
        lenient.check(&schema, &shape, "TestCase").unwrap();

        // the root value itself may be declared nullable
        is_consistent(&node(json!({"type": ["integer", "null"]})), &i64::runtime_type(), "Root").unwrap();
    }

    #[test]
    fn test_string_for_int() {
        let schema = node(model_schema(json!({"type": ["string", "null"]})));
        let err = is_consistent(&schema, &test_model(), "TestCase").unwrap_err();
        match err {
            SchemaError::SchemaTypeMismatch { expected, got, breadcrumb } => {
                assert_eq!(expected, "string");
                assert_eq!(got, "integer");
                assert_eq!(breadcrumb, "TestCase.count");
            }
            other => panic!("Expected SchemaTypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_object_for_int() {
        let schema = node(model_schema(json!({"type": ["object", "null"]})));
        let err = is_consistent(&schema, &test_model(), "TestCase").unwrap_err();
        assert!(matches!(err, SchemaError::SchemaTypeMismatch { ref expected, .. } if expected == "map or struct"));
    }

    #[test]
    fn test_extra_property() {
        let mut value = model_schema(json!({"type": ["integer", "null"]}));
        value["properties"]["extra"] = json!({"type": "string"});
        let err = is_consistent(&node(value), &test_model(), "TestCase").unwrap_err();
        assert!(matches!(err, SchemaError::AdditionalProperty { ref property, .. } if property == "extra"));
    }

    #[test]
    fn test_root_pointer_exempt_from_nullability() {
        let schema = node(json!({"type": "integer"}));
        is_consistent(&schema, &Option::<i32>::runtime_type(), "Root").unwrap();
    }

    #[test]
    fn test_server_defined_field() {
        let shape = RuntimeType::object(vec![
            FieldShape::new("id", String::runtime_type()),
            FieldShape::new("name", String::runtime_type()),
        ]);
        let schema = node(json!({"type": "object", "properties": {"name": {"type": "string"}}}));
        is_consistent(&schema, &shape, "Widget").unwrap();

        let strict = ConsistencyValidator::new(ConsistencyOptions {
            server_defined_fields: Vec::new(),
            ..Default::default()
        });
        let err = strict.check(&schema, &shape, "Widget").unwrap_err();
        assert!(matches!(err, SchemaError::MissingPropertyInSchema { ref property, .. } if property == "id"));
    }

    #[test]
    fn test_struct_rejects_open_schema() {
        let shape = RuntimeType::object(vec![FieldShape::new("name", String::runtime_type())]);
        let schema = node(json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "additionalProperties": true
        }));
        let err = is_consistent(&schema, &shape, "Widget").unwrap_err();
        assert!(matches!(err, SchemaError::OpenStructSchema { .. }));
    }

    #[test]
    fn test_empty_wire_name() {
        let shape = RuntimeType::object(vec![FieldShape::renamed("name", "", String::runtime_type())]);
        let schema = node(json!({"type": "object"}));
        let err = is_consistent(&schema, &shape, "Widget").unwrap_err();
        assert!(matches!(err, SchemaError::EmptyWireName { ref declared_name, .. } if declared_name == "name"));
    }

    #[test]
    fn test_map_rules() {
        let shape = RuntimeType::object(vec![FieldShape::new(
            "labels",
            RuntimeType::map(RuntimeType::string()),
        )]);

        let open = node(json!({
            "type": "object",
            "properties": {
                "labels": {"type": ["object", "null"], "additionalProperties": {"type": "string"}}
            }
        }));
        is_consistent(&open, &shape, "Widget").unwrap();

        let not_nullable = node(json!({
            "type": "object",
            "properties": {"labels": {"type": "object", "additionalProperties": {"type": "string"}}}
        }));
        let err = is_consistent(&not_nullable, &shape, "Widget").unwrap_err();
        assert!(matches!(err, SchemaError::NotNullable { ref breadcrumb } if breadcrumb == "Widget.labels"));

        let strict = node(json!({
            "type": "object",
            "properties": {
                "labels": {"type": ["object", "null"], "properties": {"a": {"type": "string"}}, "additionalProperties": false}
            }
        }));
        let err = is_consistent(&strict, &shape, "Widget").unwrap_err();
        assert!(matches!(err, SchemaError::StrictMapMismatch { .. }));

        let wrong_value = node(json!({
            "type": "object",
            "properties": {
                "labels": {"type": ["object", "null"], "additionalProperties": {"type": "integer"}}
            }
        }));
        let err = is_consistent(&wrong_value, &shape, "Widget").unwrap_err();
        assert!(matches!(err, SchemaError::SchemaTypeMismatch { ref breadcrumb, .. } if breadcrumb == "Widget.labels[key]"));
    }

    #[test]
    fn test_array_items_and_alternatives() {
        let part = RuntimeType::object(vec![FieldShape::new("name", String::runtime_type())]);
        let shape = RuntimeType::object(vec![FieldShape::new("parts", RuntimeType::array(part))]);

        let ok = node(json!({
            "type": "object",
            "properties": {
                "parts": {
                    "type": "array",
                    "items": {"type": "object", "properties": {"name": {"type": "string"}}}
                }
            }
        }));
        is_consistent(&ok, &shape, "Widget").unwrap();

        let bad_item = node(json!({
            "type": "object",
            "properties": {
                "parts": {
                    "type": "array",
                    "items": {"type": "object", "properties": {"name": {"type": "boolean"}}}
                }
            }
        }));
        let err = is_consistent(&bad_item, &shape, "Widget").unwrap_err();
        assert!(matches!(err, SchemaError::SchemaTypeMismatch { ref breadcrumb, .. } if breadcrumb == "Widget.parts.0.name"));

        let bad_alternative = node(json!({
            "type": "object",
            "properties": {
                "parts": {"type": "array", "allOf": [{"type": "string"}]}
            }
        }));
        let err = is_consistent(&bad_alternative, &shape, "Widget").unwrap_err();
        assert!(matches!(err, SchemaError::SchemaTypeMismatch { ref expected, .. } if expected == "string"));

        let not_array = node(json!({"type": "array"}));
        let err = is_consistent(&not_array, &RuntimeType::string(), "Tags").unwrap_err();
        assert!(matches!(err, SchemaError::SchemaTypeMismatch { ref expected, .. } if expected == "array"));
    }

    #[test]
    fn test_unsupported_union_and_missing_type() {
        let schema = node(json!({"type": ["integer", "string"]}));
        let err = is_consistent(&schema, &RuntimeType::integer(), "Root").unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedTypeUnion { ref types, .. } if types.len() == 2));

        let schema = node(json!({"description": "untyped"}));
        let err = is_consistent(&schema, &RuntimeType::integer(), "Root").unwrap_err();
        assert!(matches!(err, SchemaError::MissingType { .. }));

        let schema = node(json!({"type": "tuple"}));
        let err = is_consistent(&schema, &RuntimeType::integer(), "Root").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { ref type_name, .. } if type_name == "tuple"));
    }

    #[test]
    fn test_references_and_nullable_ref_idiom() {
        let part = RuntimeType::object(vec![FieldShape::new("name", String::runtime_type())]).entity("Part");
        let shape = RuntimeType::object(vec![
            FieldShape::new("main", part.clone()),
            FieldShape::new("spare", part.optional()),
        ]);

        let schema = node(json!({
            "type": "object",
            "properties": {
                "main": {"$ref": "#/definitions/Part"},
                "spare": {"oneOf": [{"type": "null"}, {"$ref": "#/definitions/Part"}]}
            },
            "definitions": {
                "Part": {"type": "object", "properties": {"name": {"type": "string"}}}
            }
        }));
        is_consistent(&schema, &shape, "Widget").unwrap();

        let unresolved = node(json!({
            "type": "object",
            "properties": {"main": {"$ref": "#/definitions/Part"}, "spare": {"$ref": "#/definitions/Part"}}
        }));
        let err = is_consistent(&unresolved, &shape, "Widget").unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedReference { ref identifier } if identifier == "Part"));

        let foreign = node(json!({
            "type": "object",
            "properties": {"main": {"$ref": "#/components/schemas/Part"}, "spare": true}
        }));
        let err = is_consistent(&foreign, &shape, "Widget").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidReference { .. }));
    }

    #[test]
    fn test_optional_non_entity_needs_nullable_ref() {
        let part = RuntimeType::object(vec![FieldShape::new("name", String::runtime_type())]);
        let shape = RuntimeType::object(vec![FieldShape::new("spare", part.optional())]);
        let schema = node(json!({
            "type": "object",
            "properties": {"spare": {"$ref": "#/definitions/Part"}},
            "definitions": {"Part": {"type": "object", "properties": {"name": {"type": "string"}}}}
        }));
        let err = is_consistent(&schema, &shape, "Widget").unwrap_err();
        assert!(matches!(err, SchemaError::NotNullable { .. }));
    }

    #[test]
    fn test_opaque_values() {
        let shape = RuntimeType::object(vec![
            FieldShape::new("payload", serde_json::Value::runtime_type()),
            FieldShape::new("tags", Vec::<String>::runtime_type()),
        ]);

        let schema = node(json!({
            "type": "object",
            "properties": {
                "payload": {"type": "object", "properties": {"anything": {"type": "string"}}},
                "tags": {"type": "array", "items": true}
            }
        }));
        let err = is_consistent(&schema, &shape, "Event").unwrap_err();
        assert!(matches!(err, SchemaError::InterfaceWithoutSchema { ref breadcrumb } if breadcrumb == "Event.tags.0"));

        let opaque_items = RuntimeType::object(vec![
            FieldShape::new("payload", serde_json::Value::runtime_type()),
            FieldShape::new("tags", Vec::<serde_json::Value>::runtime_type()),
        ]);
        is_consistent(&schema, &opaque_items, "Event").unwrap();
    }

    #[test]
    fn test_exempt_subtree() {
        let shape = RuntimeType::object(vec![FieldShape::new(
            "legacy",
            RuntimeType::integer().exempt(),
        )]);
        let schema = node(json!({
            "type": "object",
            "properties": {"legacy": {"type": ["string", "integer"]}}
        }));
        is_consistent(&schema, &shape, "Widget").unwrap();
    }

    #[test]
    fn test_depth_limit() {
        let mut shape = RuntimeType::string();
        let mut schema = SchemaNode::of_type("string");
        for _ in 0..6 {
            shape = RuntimeType::array(shape);
            schema = SchemaNode::of_type("array").with_items(schema);
        }

        let shallow = ConsistencyValidator::new(ConsistencyOptions {
            max_depth: 4,
            ..Default::default()
        });
        let err = shallow.check(&schema, &shape, "Deep").unwrap_err();
        assert!(matches!(err, SchemaError::DepthLimitExceeded { limit: 4, .. }));

        is_consistent(&schema, &shape, "Deep").unwrap();
    }
}
