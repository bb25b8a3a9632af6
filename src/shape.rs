//! Runtime Type Descriptors
//!
//! A [`RuntimeType`] is the structural description of a concrete Rust type that
//! the consistency validator compares against a schema. Descriptors are built
//! once per type, either through the [`Shaped`] trait or by hand with the
//! builder constructors, and can be loaded from entity bundles via serde.
//!
//! ```text
//! { "kind": "object",
//!   "fields": [
//!     { "declared_name": "count", "wire_name": "count",
//!       "type": { "kind": "integer", "optional": true } } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::entity::ValidationExempt;

/// Structural description of a runtime type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeType {
    #[serde(flatten)]
    pub kind: Kind,

    /// Pointer-like: the value can be physically absent
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,

    /// Name of the schema-capable entity this type is, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    /// Skip hook: the subtree is not checked
    #[serde(default, skip_serializing_if = "is_false")]
    pub exempt: bool,
}

/// Kind of a runtime type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Kind {
    Boolean,
    Integer,
    Number,
    String,
    Bytes,
    Timestamp,
    /// Struct with a fixed field list
    Object { fields: Vec<FieldShape> },
    /// String-keyed map
    Map { value: Box<RuntimeType> },
    /// Sequence
    Array { element: Box<RuntimeType> },
    /// Shape decided at runtime (`serde_json::Value`, raw JSON)
    Opaque,
}

/// One field of an object kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldShape {
    /// Name of the field in source code
    pub declared_name: String,
    /// Name of the field on the wire
    pub wire_name: String,
    #[serde(rename = "type")]
    pub ty: RuntimeType,
    /// Omitted from output when empty
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_when_empty: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Kind {
    /// Name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Timestamp => "timestamp",
            Self::Object { .. } => "struct",
            Self::Map { .. } => "map",
            Self::Array { .. } => "array",
            Self::Opaque => "opaque",
        }
    }
}

impl RuntimeType {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            optional: false,
            entity: None,
            exempt: false,
        }
    }

    pub fn boolean() -> Self {
        Self::new(Kind::Boolean)
    }

    pub fn integer() -> Self {
        Self::new(Kind::Integer)
    }

    pub fn number() -> Self {
        Self::new(Kind::Number)
    }

    pub fn string() -> Self {
        Self::new(Kind::String)
    }

    pub fn bytes() -> Self {
        Self::new(Kind::Bytes)
    }

    pub fn timestamp() -> Self {
        Self::new(Kind::Timestamp)
    }

    pub fn opaque() -> Self {
        Self::new(Kind::Opaque)
    }

    pub fn object(fields: Vec<FieldShape>) -> Self {
        Self::new(Kind::Object { fields })
    }

    pub fn map(value: RuntimeType) -> Self {
        Self::new(Kind::Map {
            value: Box::new(value),
        })
    }

    pub fn array(element: RuntimeType) -> Self {
        Self::new(Kind::Array {
            element: Box::new(element),
        })
    }

    /// Mark as pointer-like
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark as the runtime form of a named schema-capable entity
    pub fn entity(mut self, name: impl Into<String>) -> Self {
        self.entity = Some(name.into());
        self
    }

    /// Exclude from consistency checks
    pub fn exempt(mut self) -> Self {
        self.exempt = true;
        self
    }

    /// Apply a value's skip hook
    pub fn skip_if<T: ValidationExempt + ?Sized>(mut self, value: &T) -> Self {
        self.exempt = value.should_skip_schema_validation();
        self
    }

    pub fn is_entity(&self) -> bool {
        self.entity.is_some()
    }

    pub fn fields(&self) -> &[FieldShape] {
        match &self.kind {
            Kind::Object { fields } => fields,
            _ => &[],
        }
    }
}

impl FieldShape {
    /// Field whose wire name equals its declared name
    pub fn new(name: impl Into<String>, ty: RuntimeType) -> Self {
        let name = name.into();
        Self {
            declared_name: name.clone(),
            wire_name: name,
            ty,
            skip_when_empty: false,
        }
    }

    /// Field with a distinct wire name
    pub fn renamed(declared_name: impl Into<String>, wire_name: impl Into<String>, ty: RuntimeType) -> Self {
        Self {
            declared_name: declared_name.into(),
            wire_name: wire_name.into(),
            ty,
            skip_when_empty: false,
        }
    }

    pub fn skip_when_empty(mut self) -> Self {
        self.skip_when_empty = true;
        self
    }
}

// =============================================================================
// Shaped
// =============================================================================

/// Types that can describe their own structure
pub trait Shaped {
    fn runtime_type() -> RuntimeType;
}

macro_rules! shaped_as {
    ($ctor:ident: $($ty:ty),+) => {
        $(
            impl Shaped for $ty {
                fn runtime_type() -> RuntimeType {
                    RuntimeType::$ctor()
                }
            }
        )+
    };
}

shaped_as!(boolean: bool);
shaped_as!(integer: i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
shaped_as!(number: f32, f64);
shaped_as!(string: String, str, char);
shaped_as!(opaque: serde_json::Value);
shaped_as!(timestamp: chrono::NaiveDateTime, chrono::NaiveDate);

impl<Tz: chrono::TimeZone> Shaped for chrono::DateTime<Tz> {
    fn runtime_type() -> RuntimeType {
        RuntimeType::timestamp()
    }
}

impl<T: Shaped> Shaped for Option<T> {
    fn runtime_type() -> RuntimeType {
        T::runtime_type().optional()
    }
}

impl<T: Shaped + ?Sized> Shaped for Box<T> {
    fn runtime_type() -> RuntimeType {
        T::runtime_type()
    }
}

impl<T: Shaped> Shaped for Vec<T> {
    fn runtime_type() -> RuntimeType {
        RuntimeType::array(T::runtime_type())
    }
}

impl<V: Shaped, S> Shaped for HashMap<String, V, S> {
    fn runtime_type() -> RuntimeType {
        RuntimeType::map(V::runtime_type())
    }
}

impl<V: Shaped> Shaped for BTreeMap<String, V> {
    fn runtime_type() -> RuntimeType {
        RuntimeType::map(V::runtime_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Gadget;

    impl Shaped for Gadget {
        fn runtime_type() -> RuntimeType {
            RuntimeType::object(vec![
                FieldShape::new("id", String::runtime_type()),
                FieldShape::renamed("display_name", "displayName", Option::<String>::runtime_type()),
                FieldShape::new("tags", Vec::<String>::runtime_type()).skip_when_empty(),
            ])
            .entity("Gadget")
        }
    }

    #[test]
    fn test_std_shapes() {
        assert_eq!(u32::runtime_type().kind, Kind::Integer);
        assert_eq!(f64::runtime_type().kind, Kind::Number);
        assert_eq!(chrono::DateTime::<chrono::Utc>::runtime_type().kind, Kind::Timestamp);
        assert_eq!(serde_json::Value::runtime_type().kind, Kind::Opaque);

        let opt = Option::<i64>::runtime_type();
        assert!(opt.optional);
        assert_eq!(opt.kind, Kind::Integer);

        let map = HashMap::<String, Vec<bool>>::runtime_type();
        match map.kind {
            Kind::Map { value } => {
                assert_eq!(value.kind, Kind::Array { element: Box::new(RuntimeType::boolean()) });
            }
            other => panic!("Expected Map, got {:?}", other),
        }
    }

    #[test]
    fn test_serde_form() {
        let shape = Gadget::runtime_type();
        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "object",
                "entity": "Gadget",
                "fields": [
                    {"declared_name": "id", "wire_name": "id", "type": {"kind": "string"}},
                    {"declared_name": "display_name", "wire_name": "displayName",
                     "type": {"kind": "string", "optional": true}},
                    {"declared_name": "tags", "wire_name": "tags", "skip_when_empty": true,
                     "type": {"kind": "array", "element": {"kind": "string"}}}
                ]
            })
        );

        let parsed: RuntimeType = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, shape);
    }

    #[test]
    fn test_skip_hook() {
        struct Legacy;
        impl ValidationExempt for Legacy {
            fn should_skip_schema_validation(&self) -> bool {
                true
            }
        }

        let shape = RuntimeType::opaque().skip_if(&Legacy);
        assert!(shape.exempt);
    }
}
