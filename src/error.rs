//! Error types for schema resolution, consistency checks and definition collection

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// A single failure reported by the example validator
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    /// JSON pointer of the offending value ("" for the document root)
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Schema errors
#[derive(Error, Debug)]
pub enum SchemaError {
    // === Resolution ===
    #[error("Unresolved reference: entity {identifier} not found")]
    UnresolvedReference { identifier: String },

    #[error("Entity {identifier} does not provide a schema")]
    NotSchemaCapable { identifier: String },

    #[error("Invalid reference {reference} at {breadcrumb}: expected prefix {expected_prefix}")]
    InvalidReference {
        breadcrumb: String,
        reference: String,
        expected_prefix: String,
    },

    // === Type extraction ===
    #[error("Unsupported type union at {breadcrumb}: {types:?} (only null plus one other type is allowed)")]
    UnsupportedTypeUnion { breadcrumb: String, types: Vec<String> },

    #[error("Schema at {breadcrumb} is missing a type")]
    MissingType { breadcrumb: String },

    #[error("Unknown schema type {type_name} at {breadcrumb}")]
    UnknownType { breadcrumb: String, type_name: String },

    // === Consistency ===
    #[error("Nullability of {breadcrumb} does not match its schema")]
    NotNullable { breadcrumb: String },

    #[error("Schema type mismatch at {breadcrumb}: expected {expected}, got {got}")]
    SchemaTypeMismatch {
        expected: String,
        got: String,
        breadcrumb: String,
    },

    #[error("{breadcrumb} has no schema property for field {property}")]
    MissingPropertyInSchema { breadcrumb: String, property: String },

    #[error("{breadcrumb} declares property {property} with no matching field")]
    AdditionalProperty { breadcrumb: String, property: String },

    #[error("{breadcrumb} is a map but its schema is a strict object")]
    StrictMapMismatch { breadcrumb: String },

    #[error("{breadcrumb} should have a definite schema")]
    InterfaceWithoutSchema { breadcrumb: String },

    #[error("{breadcrumb} is a struct but its schema allows additional properties")]
    OpenStructSchema { breadcrumb: String },

    #[error("Field {declared_name} at {breadcrumb} has an empty wire name")]
    EmptyWireName {
        breadcrumb: String,
        declared_name: String,
    },

    #[error("Entity {name} has no runtime shape to check")]
    MissingRuntimeShape { name: String },

    #[error("Depth limit of {limit} exceeded at {breadcrumb}")]
    DepthLimitExceeded { breadcrumb: String, limit: usize },

    // === Collection ===
    #[error("Definition name is empty")]
    EmptyDefinitionName,

    #[error("Definition {name} already exists but with a different definition")]
    ConflictingDefinition { name: String, diff: String },

    #[error("Definition {new_name} collides case-insensitively with existing definition {existing_name}")]
    CaseInsensitiveCollision {
        existing_name: String,
        new_name: String,
    },

    // === Documents ===
    #[error("Invalid schema for {name}: {reason}")]
    InvalidSchema { name: String, reason: String },

    #[error("Example for {name} failed validation: {}", format_field_errors(.errors))]
    ExampleInvalid { name: String, errors: Vec<FieldError> },

    #[error("Duplicate property {property} while merging schemas")]
    DuplicateProperty { property: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Breadcrumb of the offending position, for errors raised during traversal
    pub fn breadcrumb(&self) -> Option<&str> {
        match self {
            Self::InvalidReference { breadcrumb, .. }
            | Self::UnsupportedTypeUnion { breadcrumb, .. }
            | Self::MissingType { breadcrumb }
            | Self::UnknownType { breadcrumb, .. }
            | Self::NotNullable { breadcrumb }
            | Self::SchemaTypeMismatch { breadcrumb, .. }
            | Self::MissingPropertyInSchema { breadcrumb, .. }
            | Self::AdditionalProperty { breadcrumb, .. }
            | Self::StrictMapMismatch { breadcrumb }
            | Self::InterfaceWithoutSchema { breadcrumb }
            | Self::OpenStructSchema { breadcrumb }
            | Self::EmptyWireName { breadcrumb, .. }
            | Self::DepthLimitExceeded { breadcrumb, .. } => Some(breadcrumb),
            _ => None,
        }
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
