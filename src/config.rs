//! Configuration management for schema resolution and checking
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schemas.toml)
//! - Environment variables (SCHEMAS__<SECTION>__<KEY>, e.g. SCHEMAS__CONSISTENCY__MAX_DEPTH)
//!
//! ## Example config file (schemas.toml):
//! ```toml
//! [references]
//! definitions_prefix = "#/definitions/"
//! output_prefix = "#/components/schemas/"
//!
//! [consistency]
//! server_defined_fields = ["id"]
//! max_depth = 128
//! allow_nullable_required = false
//!
//! [collector]
//! strip_nested_definitions = true
//!
//! [merge]
//! strategy = "overwrite_duplicates"
//!
//! [output]
//! format = "pretty"
//!
//! [bundle]
//! path = "./entities"
//! extension = ".entity.json"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::collector::CollectorOptions;
use crate::consistency::ConsistencyOptions;
use crate::graph::{WalkOptions, DEFAULT_MAX_DEPTH};
use crate::merge::MergeStrategy;
use crate::publish::PublishOptions;
use crate::resolve::{ResolverOptions, COMPONENTS_PREFIX, DEFINITIONS_PREFIX};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Reference prefixes
    #[serde(default)]
    pub references: ReferencesConfig,

    /// Consistency validator settings
    #[serde(default)]
    pub consistency: ConsistencyConfig,

    /// Definition collection settings
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Schema merging settings
    #[serde(default)]
    pub merge: MergeConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Entity bundle location
    #[serde(default)]
    pub bundle: BundleConfig,
}

/// Reference prefix configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencesConfig {
    /// Prefix of references resolved against the registry
    #[serde(default = "default_definitions_prefix")]
    pub definitions_prefix: String,

    /// Prefix used in published documents
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
}

/// Consistency validator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyConfig {
    /// Fields assigned by the server and absent from request schemas
    #[serde(default = "default_server_defined_fields")]
    pub server_defined_fields: Vec<String>,

    /// Deepest nesting accepted by walker and validator
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Accept nullable schemas for always-present fields
    #[serde(default)]
    pub allow_nullable_required: bool,
}

/// Definition collector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    #[serde(default = "default_true")]
    pub strip_nested_definitions: bool,
}

/// Schema merge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default)]
    pub strategy: MergeStrategy,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format (pretty or compact)
    #[serde(default = "default_output_format")]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Entity bundle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Bundle file or directory of bundle files
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// File suffix picked up when `path` is a directory
    #[serde(default = "default_bundle_extension")]
    pub extension: String,
}

// Default value functions
fn default_definitions_prefix() -> String {
    DEFINITIONS_PREFIX.to_string()
}

fn default_output_prefix() -> String {
    COMPONENTS_PREFIX.to_string()
}

fn default_server_defined_fields() -> Vec<String> {
    vec!["id".to_string()]
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_true() -> bool {
    true
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

fn default_bundle_extension() -> String {
    ".entity.json".to_string()
}

impl Default for ReferencesConfig {
    fn default() -> Self {
        Self {
            definitions_prefix: default_definitions_prefix(),
            output_prefix: default_output_prefix(),
        }
    }
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            server_defined_fields: default_server_defined_fields(),
            max_depth: default_max_depth(),
            allow_nullable_required: false,
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            strip_nested_definitions: true,
        }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            path: None,
            extension: default_bundle_extension(),
        }
    }
}

impl SchemaConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "schemas.toml",
            ".schemas.toml",
            "config/schemas.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "entities", "schemas") {
            let xdg_config = config_dir.config_dir().join("schemas.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (SCHEMAS__*)
        builder = builder.add_source(
            Environment::with_prefix("SCHEMAS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            max_depth: self.consistency.max_depth,
        }
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            definitions_prefix: self.references.definitions_prefix.clone(),
            walk: self.walk_options(),
        }
    }

    pub fn consistency_options(&self) -> ConsistencyOptions {
        ConsistencyOptions {
            server_defined_fields: self.consistency.server_defined_fields.clone(),
            definitions_prefix: self.references.definitions_prefix.clone(),
            max_depth: self.consistency.max_depth,
            allow_nullable_required: self.consistency.allow_nullable_required,
        }
    }

    pub fn collector_options(&self) -> CollectorOptions {
        CollectorOptions {
            strip_nested_definitions: self.collector.strip_nested_definitions,
        }
    }

    pub fn publish_options(&self) -> PublishOptions {
        PublishOptions {
            definitions_prefix: self.references.definitions_prefix.clone(),
            output_prefix: self.references.output_prefix.clone(),
            collector: self.collector_options(),
        }
    }

    /// Serialize `value` in the configured output format
    pub fn render<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        match self.output.format {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }

    /// Bundle path, resolving relative paths against the working directory
    pub fn bundle_path(&self) -> Option<PathBuf> {
        self.bundle.path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                std::env::current_dir().unwrap_or_default().join(p)
            }
        })
    }
}
