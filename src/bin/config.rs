//! Configuration CLI
//!
//! Shows the effective configuration or writes a default `schemas.toml`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use entity_schemas::SchemaConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-config")]
#[command(about = "Inspect or initialize schema tool configuration")]
struct Cli {
    /// Configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration as TOML
    Show,

    /// Write the default configuration
    Init {
        /// Destination file
        #[arg(default_value = "schemas.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
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
    match cli.command {
        Commands::Show => {
            let config = SchemaConfig::load_from(cli.config.as_deref())?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let path_str = path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("path is not valid UTF-8: {}", path.display()))?;
            SchemaConfig::default().save(path_str)?;
            println!("✅ Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}
