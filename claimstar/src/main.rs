// claimstar/src/main.rs

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG=debug claimstar run ... wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            project_dir,
            select,
        } => commands::run::execute(project_dir, select).await,
        Commands::Plan { select } => commands::plan::execute(select),
        Commands::Inspect {
            project_dir,
            table,
            limit,
        } => commands::inspect::execute(project_dir, table, limit),
        Commands::Clean { project_dir } => commands::clean::execute(project_dir),
    }
}
