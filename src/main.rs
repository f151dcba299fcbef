//! `gonetwork` command-line tool.
//!
//! Maintenance entry point for the application database: creating and
//! migrating it, diagnosing path problems, inspecting tables and listing
//! events and deliverables.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use commands::AppContext;
use gonetwork::config::{AppConfig, LoadedConfig};
use gonetwork::observability;
use std::path::PathBuf;
use std::process::ExitCode;

/// Event-production data tool.
#[derive(Parser)]
#[command(name = "gonetwork")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a JSON or TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Application root holding `data/`, `web/` and `config/`.
    #[arg(long, global = true, env = "GONETWORK_ROOT", default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database if needed and apply pending migrations.
    Init,

    /// Check the database location, schema version and tables.
    Doctor,

    /// List tables, or the columns of one table.
    Tables {
        /// Table to describe.
        table: Option<String>,
    },

    /// Show the effective configuration as JSON.
    Config,

    /// List events.
    Events,

    /// List deliverables.
    Deliverables {
        /// Only open deliverables past their deadline.
        #[arg(long)]
        overdue: bool,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let LoadedConfig {
        config,
        source,
        skipped,
    } = match AppConfig::load(cli.config.as_deref(), &cli.root) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };
    let config = config.with_env_overrides();

    if let Err(e) = observability::init_from_config(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }
    for file in &skipped {
        tracing::warn!(
            path = %file.path.display(),
            error = %file.error,
            "Skipping unreadable config file"
        );
    }
    if let Some(source) = &source {
        tracing::debug!(path = %source.display(), "Loaded configuration");
    }

    let ctx = AppContext::new(cli.root, config, source, skipped);
    let result = match cli.command {
        Commands::Init => commands::cmd_init(&ctx),
        Commands::Doctor => commands::cmd_doctor(&ctx),
        Commands::Tables { table } => commands::cmd_tables(&ctx, table.as_deref()),
        Commands::Config => commands::cmd_config(&ctx),
        Commands::Events => commands::cmd_events(&ctx),
        Commands::Deliverables { overdue } => commands::cmd_deliverables(&ctx, overdue),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}
