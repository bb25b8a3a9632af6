//! Entity Schema Check CLI
//!
//! Loads an entity bundle and reports every problem found across the
//! registry: reference cycles, dangling references, struct/schema
//! mismatches, examples that fail their own schema and definition conflicts.
//!
//! Usage:
//!   schema-check --bundle ./entities
//!   schema-check --bundle ./entities --entity Widget --format json

use std::path::PathBuf;

use clap::Parser;
use entity_schemas::bundle::load_registry;
use entity_schemas::validate::validate_example_with;
use entity_schemas::{
    ConsistencyValidator, DiagnosticItem, Diagnostics, EntityRegistry, Publisher, SchemaConfig, SchemaError,
    SchemaWalker,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-check")]
#[command(about = "Check entity schemas for consistency, valid examples and conflicts")]
struct Cli {
    /// Entity bundle file or directory (defaults to [bundle] path)
    #[arg(short, long)]
    bundle: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Only check these entities
    #[arg(short, long)]
    entity: Vec<String>,

    /// Skip example validation
    #[arg(long)]
    skip_examples: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = SchemaConfig::load_from(cli.config.as_deref())?;
    let registry = load_registry(cli.bundle.as_deref(), &config)?;
    let text = cli.format != "json";

    if text {
        println!("🔍 Checking {} entities\n", registry.len());
    }

    let names = if cli.entity.is_empty() {
        registry.names()
    } else {
        cli.entity.clone()
    };

    let mut diags = Diagnostics::new();
    check_references(&registry, &config, &mut diags)?;
    for name in &names {
        check_entity(&registry, &config, name, cli.skip_examples, &mut diags);
    }

    let publisher = Publisher::new(config.publish_options(), SchemaWalker::new(config.walk_options()));
    let selected = (!cli.entity.is_empty()).then_some(names.as_slice());
    if let Err(e) = publisher.components(&registry, selected) {
        diags.error("components", &e);
    }

    if text {
        print!("{}", diags);
        if diags.has_errors() {
            println!("❌ {} error(s) across {} entities", diags.error_count(), names.len());
        } else {
            println!("✅ All {} entities consistent", names.len());
        }
    } else {
        println!("{}", config.render(&diags)?);
    }

    if diags.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn check_references(registry: &EntityRegistry, config: &SchemaConfig, diags: &mut Diagnostics) -> anyhow::Result<()> {
    let graph = registry.reference_graph(&config.resolver_options())?;
    for cycle in graph.cycles() {
        diags.reference_cycle(&cycle);
    }
    for dangling in graph.dangling() {
        let suggestions = registry.suggest(&dangling.target, 3);
        diags.dangling_reference(dangling, &suggestions);
    }
    Ok(())
}

fn check_entity(registry: &EntityRegistry, config: &SchemaConfig, name: &str, skip_examples: bool, diags: &mut Diagnostics) {
    let Some(entity) = registry.get(name) else {
        let err = SchemaError::UnresolvedReference {
            identifier: name.to_string(),
        };
        let suggestions = registry.suggest(name, 3);
        let mut item = DiagnosticItem::from_error(name, &err);
        if !suggestions.is_empty() {
            item = item.with_context(format!("Did you mean: {}", suggestions.join(", ")));
        }
        diags.push(item);
        return;
    };

    if !entity.is_schema_capable() {
        tracing::debug!(entity = %name, "no schema, skipping");
        return;
    }

    let validator = ConsistencyValidator::new(config.consistency_options());
    if let Err(e) = validator.check_entity(&entity, registry) {
        diags.error(name, &e);
    }

    if !skip_examples && !entity.example.is_empty() {
        if let Err(e) = validate_example_with(&entity, registry, config.resolver_options()) {
            diags.error(name, &e);
        }
    }
}
