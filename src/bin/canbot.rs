//! canbot CLI - Train and inspect the can-collecting robot agent
//!
//! This CLI provides:
//! - Training a TD agent against the battery environment
//! - Inspecting the value table and greedy policy of a saved model

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "canbot")]
#[command(version, about = "Model-based TD learning for a can-collecting robot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run training episodes and save the learned model
    Train(Box<canbot::cli::commands::train::TrainArgs>),

    /// Show the value table and greedy policy of a saved model
    Policy(canbot::cli::commands::policy::PolicyArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => canbot::cli::commands::train::execute(*args),
        Commands::Policy(args) => canbot::cli::commands::policy::execute(args),
    }
}
