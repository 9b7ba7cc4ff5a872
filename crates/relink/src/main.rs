//! relink CLI - upgrade `http://` links to `https://` across a directory tree.
//!
//! relink walks a directory, selects files by extension, and rewrites one
//! literal string to another in place using a concurrent, bounded pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Rewrite every .html file under ./site
//! relink run ./site
//!
//! # Different extension and pattern, machine-readable summary
//! relink run ./docs --extension md --from http://old.example --to https://new.example --format json
//!
//! # View configuration
//! relink config show
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use relink_core::Config;

mod cli;
mod logging;

/// relink - rewrite http:// links to https:// in place.
#[derive(Parser, Debug)]
#[command(name = "relink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true, env = "RELINK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Rewrite matching files under a directory
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logging isn't up yet; a broken config is reported through the error.
    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().with_context(|| {
            format!(
                "Failed to load config from {}",
                Config::default_path().display()
            )
        })?,
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("relink v{}", relink_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, &config, cli.config.as_deref()).await,
    }
}
