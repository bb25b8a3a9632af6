//! Entity Bundles
//!
//! On-disk form of a set of entities, used by the command-line tools to
//! populate a registry:
//!
//! ```json
//! {
//!   "entities": [
//!     {
//!       "name": "Widget",
//!       "schema": {"type": "object", "properties": {...}},
//!       "example": {"name": "sprocket"},
//!       "shape": {"kind": "object", "fields": [...]}
//!     }
//!   ]
//! }
//! ```
//!
//! `schema` may be omitted for entities that cannot supply one; `shape` is
//! only needed for the consistency check.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::SchemaConfig;
use crate::entity::EntityDescriptor;
use crate::error::{Result, SchemaError};
use crate::registry::EntityRegistry;
use crate::shape::RuntimeType;

/// One entity as stored in a bundle file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleEntity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<RuntimeType>,
}

impl BundleEntity {
    pub fn into_descriptor(self) -> Result<EntityDescriptor> {
        let example = match &self.example {
            Some(value) => serde_json::to_vec(value)?,
            None => Vec::new(),
        };
        let mut descriptor = match &self.schema {
            Some(schema) => EntityDescriptor::new(self.name, serde_json::to_vec(schema)?, example),
            None => {
                let mut descriptor = EntityDescriptor::without_schema(self.name);
                descriptor.example = example;
                descriptor
            }
        };
        if let Some(shape) = self.shape {
            let shape = shape.entity(descriptor.name.clone());
            descriptor = descriptor.with_shape(shape);
        }
        Ok(descriptor)
    }
}

/// A collection of entities loaded from one or more files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityBundle {
    #[serde(default)]
    pub entities: Vec<BundleEntity>,
}

impl EntityBundle {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Load a bundle file, or every file under a directory whose name ends in `extension`
    ///
    /// Directory entries are read in path order.
    pub fn load(path: &Path, extension: &str) -> Result<Self> {
        if !path.is_dir() {
            tracing::debug!(path = %path.display(), "loading entity bundle");
            return Self::from_slice(&std::fs::read(path)?);
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_string_lossy().ends_with(extension))
            .map(|e| e.into_path())
            .collect();
        files.sort();

        let mut bundle = Self::default();
        for file in &files {
            tracing::debug!(path = %file.display(), "loading entity bundle");
            bundle.entities.extend(Self::from_slice(&std::fs::read(file)?)?.entities);
        }
        tracing::info!(files = files.len(), entities = bundle.entities.len(), "loaded entity bundles");
        Ok(bundle)
    }

    /// Register every entity; later entries replace earlier ones of the same name
    pub fn register_into(self, registry: &EntityRegistry) -> Result<()> {
        for entity in self.entities {
            registry.register(entity.into_descriptor()?);
        }
        Ok(())
    }

    pub fn into_registry(self) -> Result<EntityRegistry> {
        let registry = EntityRegistry::new();
        self.register_into(&registry)?;
        Ok(registry)
    }
}

/// Registry loaded from `path`, falling back to the configured bundle path
pub fn load_registry(path: Option<&Path>, config: &SchemaConfig) -> Result<EntityRegistry> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config.bundle_path().ok_or_else(|| {
            SchemaError::Config("no entity bundle given; pass --bundle or set [bundle] path".to_string())
        })?,
    };
    EntityBundle::load(&path, &config.bundle.extension)?.into_registry()
}
