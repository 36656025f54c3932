//! ACE CLI: the main entry point.
//!
//! Commands:
//! - `onboard`  : Write a default config and sample task
//! - `run`      : Run the generator → reflector → curator loop on a task
//! - `doctor`   : Diagnose config and gateway reachability
//! - `providers`: List built-in gateway endpoints

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "ace",
    about = "ACE — grow a playbook of strategies from reflection on model answers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write ~/.ace/config.toml and a sample task
    Onboard,

    /// Run the playbook loop on a task
    Run {
        /// Task file (TOML with system_prompt, user_prompt, ground_truth)
        #[arg(short, long)]
        task: Option<PathBuf>,

        /// Number of iterations (overrides loop.iterations)
        #[arg(short = 'n', long)]
        iterations: Option<usize>,

        /// Print the final playbook as JSON instead of progress output
        #[arg(long)]
        json: bool,
    },

    /// Diagnose config and gateway health
    Doctor,

    /// List built-in providers
    Providers,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing. Logs go to stderr so `--json` output stays clean.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Run {
            task,
            iterations,
            json,
        } => commands::run::run(task, iterations, json).await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Providers => commands::providers::run().await?,
    }

    Ok(())
}
