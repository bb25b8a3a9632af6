//! Diagnostics
//!
//! Collects warnings and errors produced while checking a registry, so a
//! single run can report every broken entity instead of stopping at the first.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SchemaError;
use crate::graph::DanglingReference;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Resolution ===
    /// Referenced entity is not registered
    UnresolvedReference,
    /// Referenced entity has no schema
    NotSchemaCapable,
    /// Reference token does not use the definitions prefix
    InvalidReference,
    /// Schema refers, directly or through others, back to itself
    ReferenceCycle,

    // === Consistency ===
    /// Runtime type and schema type disagree
    TypeMismatch,
    /// Schema nullability disagrees with the value's optionality
    NotNullable,
    /// Struct field absent from the schema's properties
    MissingProperty,
    /// Schema property with no struct field
    AdditionalProperty,
    /// Struct described by an open object schema, or map by a strict one
    ObjectStrictness,
    /// Non-opaque value with no definite schema
    IndefiniteSchema,
    /// `type` keyword missing, unknown or an unsupported union
    TypeDeclaration,
    /// Field with an empty wire name
    EmptyWireName,
    /// Entity without a runtime shape
    MissingShape,
    /// Traversal exceeded the configured depth
    DepthLimit,

    // === Collection ===
    /// Same definition name, different content
    ConflictingDefinition,
    /// Names differing only by case
    NameCollision,

    // === Documents ===
    /// Example fails its own schema
    InvalidExample,
    /// Schema document could not be parsed or compiled
    InvalidSchema,
    /// Anything else
    Other,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnresolvedReference => "E001",
            Self::NotSchemaCapable => "E002",
            Self::InvalidReference => "E003",
            Self::ReferenceCycle => "I001",
            Self::TypeMismatch => "E004",
            Self::NotNullable => "E005",
            Self::MissingProperty => "E006",
            Self::AdditionalProperty => "E007",
            Self::ObjectStrictness => "E008",
            Self::IndefiniteSchema => "E009",
            Self::TypeDeclaration => "E010",
            Self::EmptyWireName => "E011",
            Self::MissingShape => "W001",
            Self::DepthLimit => "E012",
            Self::ConflictingDefinition => "E013",
            Self::NameCollision => "E014",
            Self::InvalidExample => "E015",
            Self::InvalidSchema => "E016",
            Self::Other => "E099",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::ReferenceCycle => Severity::Info,
            Self::MissingShape => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Code for an error raised by resolution, checking or collection
    pub fn for_error(error: &SchemaError) -> Self {
        match error {
            SchemaError::UnresolvedReference { .. } => Self::UnresolvedReference,
            SchemaError::NotSchemaCapable { .. } => Self::NotSchemaCapable,
            SchemaError::InvalidReference { .. } => Self::InvalidReference,
            SchemaError::UnsupportedTypeUnion { .. }
            | SchemaError::MissingType { .. }
            | SchemaError::UnknownType { .. } => Self::TypeDeclaration,
            SchemaError::NotNullable { .. } => Self::NotNullable,
            SchemaError::SchemaTypeMismatch { .. } => Self::TypeMismatch,
            SchemaError::MissingPropertyInSchema { .. } => Self::MissingProperty,
            SchemaError::AdditionalProperty { .. } => Self::AdditionalProperty,
            SchemaError::StrictMapMismatch { .. } | SchemaError::OpenStructSchema { .. } => {
                Self::ObjectStrictness
            }
            SchemaError::InterfaceWithoutSchema { .. } => Self::IndefiniteSchema,
            SchemaError::EmptyWireName { .. } => Self::EmptyWireName,
            SchemaError::MissingRuntimeShape { .. } => Self::MissingShape,
            SchemaError::DepthLimitExceeded { .. } => Self::DepthLimit,
            SchemaError::ConflictingDefinition { .. } => Self::ConflictingDefinition,
            SchemaError::CaseInsensitiveCollision { .. } | SchemaError::EmptyDefinitionName => {
                Self::NameCollision
            }
            SchemaError::ExampleInvalid { .. } => Self::InvalidExample,
            SchemaError::InvalidSchema { .. } | SchemaError::Json(_) => Self::InvalidSchema,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Entity being checked when the issue was found
    pub entity: String,
    pub code: DiagnosticCode,
    /// Position inside the entity, for traversal errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadcrumb: Option<String>,
    /// Human-readable message
    pub message: String,
    /// Additional context (diffs, suggestions)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(entity: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            code,
            breadcrumb: None,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Item describing `error`, carrying its breadcrumb and, for conflicts, the diff
    pub fn from_error(entity: impl Into<String>, error: &SchemaError) -> Self {
        let mut item = Self::new(entity, DiagnosticCode::for_error(error), error.to_string());
        item.breadcrumb = error.breadcrumb().map(str::to_string);
        match error {
            SchemaError::ConflictingDefinition { diff, .. } => item.with_context(diff.trim_end()),
            SchemaError::ExampleInvalid { errors, .. } => {
                errors.iter().fold(item, |item, e| item.with_context(e.to_string()))
            }
            _ => item,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.entity
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from a checking run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic item
    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    /// Record a failed operation on `entity`
    pub fn error(&mut self, entity: impl Into<String>, error: &SchemaError) {
        self.push(DiagnosticItem::from_error(entity, error));
    }

    /// Record a group of mutually referencing entities
    pub fn reference_cycle(&mut self, members: &[String]) {
        let first = members.first().map(String::as_str).unwrap_or("?");
        self.push(
            DiagnosticItem::new(
                first,
                DiagnosticCode::ReferenceCycle,
                format!("Reference cycle through {} entities", members.len()),
            )
            .with_context(format!("Members: {}", members.join(" -> "))),
        );
    }

    /// Record a reference to an unregistered entity, with any close matches
    pub fn dangling_reference(&mut self, dangling: &DanglingReference, suggestions: &[String]) {
        let mut item = DiagnosticItem::new(
            &dangling.from,
            DiagnosticCode::UnresolvedReference,
            format!("$ref target '{}' is not a registered entity", dangling.target),
        );
        if !suggestions.is_empty() {
            item = item.with_context(format!("Did you mean: {}", suggestions.join(", ")));
        }
        self.push(item);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Error)
    }

    /// Get all errors
    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Error)
    }

    /// Get all warnings
    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }

        if self.has_errors() {
            output.push_str(&format!(
                "\n{} error(s), {} warning(s)\n",
                self.error_count(),
                self.warning_count()
            ));
        } else if self.warning_count() > 0 {
            output.push_str(&format!("\n{} warning(s)\n", self.warning_count()));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}
