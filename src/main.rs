//! pensum CLI - assign catalog courses to a program's graduation requirements.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pensum_core::{Assigner, EngineConfig, Requirements};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "pensum")]
#[command(version)]
#[command(about = "Assign courses to graduation requirements")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign catalog courses to requirement sections
    Assign {
        /// JSON file holding the list of requirement sections
        #[arg(short, long)]
        requirements: PathBuf,

        /// JSON file holding the list of courses
        #[arg(short = 'k', long)]
        catalog: PathBuf,

        /// Where to write the result (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
    },

    /// Show how requirement sections normalize into rule buckets
    Normalize {
        /// JSON file holding the list of requirement sections
        #[arg(short, long)]
        requirements: PathBuf,
    },

    /// Show example configuration
    ExampleConfig,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn read_json(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Result written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Assign {
            requirements,
            catalog,
            output,
            pretty,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let assigner = Assigner::new(config)?;
            let sections = read_json(&requirements)?;
            let courses = read_json(&catalog)?;

            let result = assigner
                .assign_values(&sections, &courses)
                .context("Assignment failed")?;
            info!(
                credits = %result.credits,
                unused = result.unused.len(),
                "Assigned courses"
            );
            write_json(&result, output.as_deref(), pretty)?;
        }

        Commands::Normalize { requirements } => {
            let sections = read_json(&requirements)?;
            let sections = sections
                .as_array()
                .context("Requirement sections must be a JSON list")?;
            let normalized = Requirements::from_values(sections);
            let collisions = normalized.tag_collisions();
            if !collisions.is_empty() {
                tracing::warn!(?collisions, "Tags used by more than one rule");
            }
            write_json(&normalized, None, true)?;
        }

        Commands::ExampleConfig => {
            println!("{}", EngineConfig::example());
        }
    }

    Ok(())
}
