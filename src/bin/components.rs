//! Components Export CLI
//!
//! Collects the published schemas of registered entities into a single
//! `{"components": {"schemas": {...}}}` document.

use std::path::PathBuf;

use clap::Parser;
use entity_schemas::bundle::load_registry;
use entity_schemas::{Publisher, SchemaConfig, SchemaWalker};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-components")]
#[command(about = "Export published entity schemas as one components document")]
struct Cli {
    /// Entity bundle file or directory (defaults to [bundle] path)
    #[arg(short, long)]
    bundle: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Only export these entities (and what they define)
    #[arg(short, long)]
    entity: Vec<String>,

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

    let publisher = Publisher::new(config.publish_options(), SchemaWalker::new(config.walk_options()));
    let selected = (!cli.entity.is_empty()).then_some(cli.entity.as_slice());
    let table = publisher.components(&registry, selected)?;

    let rendered = config.render(&table.to_components()?)?;
    match cli.output {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            println!("✅ Exported {} schemas to {}", table.len(), path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
