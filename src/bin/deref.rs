//! Schema Dereference CLI
//!
//! Prints an entity's schema with every referenced entity inlined under
//! `definitions`, optionally rewritten to the published reference prefix.

use std::path::PathBuf;

use clap::Parser;
use entity_schemas::bundle::load_registry;
use entity_schemas::resolve::rewrite_for_output_with;
use entity_schemas::{ReferenceResolver, SchemaConfig, SchemaWalker};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-deref")]
#[command(about = "Inline referenced entities into an entity's schema")]
struct Cli {
    /// Entity to dereference
    entity: String,

    /// Entity bundle file or directory (defaults to [bundle] path)
    #[arg(short, long)]
    bundle: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Inline only direct references
    #[arg(long)]
    shallow: bool,

    /// Rewrite references to the output prefix
    #[arg(long)]
    publish: bool,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
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

    let Some(entity) = registry.get(&cli.entity) else {
        let suggestions = registry.suggest(&cli.entity, 3);
        if suggestions.is_empty() {
            anyhow::bail!("entity {} not found", cli.entity);
        }
        anyhow::bail!("entity {} not found; did you mean: {}", cli.entity, suggestions.join(", "));
    };

    let resolver = ReferenceResolver::with_options(&registry, config.resolver_options());
    let schema = entity.parse_schema()?;
    let mut schema = if cli.shallow {
        resolver.dereference(schema)?
    } else {
        resolver.dereference_transitive(schema)?
    };

    if cli.publish {
        rewrite_for_output_with(
            &SchemaWalker::new(config.walk_options()),
            &mut schema,
            &config.references.definitions_prefix,
            &config.references.output_prefix,
        )?;
    }

    let rendered = config.render(&schema)?;
    match cli.output {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            println!("✅ Wrote {} ({} definitions) to {}", cli.entity, schema.definitions.len(), path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
