// claimstar/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "claimstar")]
#[command(about = "Builds a layered healthcare-claims warehouse (bronze -> silver -> gold star schema)", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Debug-level logs (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Builds the warehouse: raw CSV -> bronze -> silver -> gold
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Build only these tables and their upstream dependencies (ex: "gold_fact_claims")
        #[arg(long, short)]
        select: Vec<String>,
    },

    /// Prints the execution layers without building anything
    Plan {
        /// Restrict the plan to these tables and their upstream dependencies
        #[arg(long, short)]
        select: Vec<String>,
    },

    /// Inspects a built table (schema + sample rows)
    Inspect {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Table name to inspect
        #[arg(long, short)]
        table: String,

        /// Number of sample rows to display
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Cleans build artifacts (target/ folder)
    Clean {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() -> Result<()> {
        let args = Cli::parse_from(["claimstar", "run"]);
        assert!(!args.verbose);
        match args.command {
            Commands::Run {
                project_dir,
                select,
            } => {
                assert_eq!(project_dir.to_string_lossy(), ".");
                assert!(select.is_empty());
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_select() -> Result<()> {
        let args = Cli::parse_from([
            "claimstar",
            "run",
            "--select",
            "gold_fact_claims",
            "-s",
            "gold_dim_payer",
            "--project-dir",
            "/tmp",
            "--verbose",
        ]);
        assert!(args.verbose);
        match args.command {
            Commands::Run {
                project_dir,
                select,
            } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp");
                assert_eq!(select, vec!["gold_fact_claims", "gold_dim_payer"]);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_inspect() -> Result<()> {
        let args = Cli::parse_from(["claimstar", "inspect", "--table", "gold_dim_date", "--limit", "10"]);
        match args.command {
            Commands::Inspect {
                table,
                limit,
                project_dir,
            } => {
                assert_eq!(table, "gold_dim_date");
                assert_eq!(limit, 10);
                assert_eq!(project_dir.to_string_lossy(), ".");
                Ok(())
            }
            _ => bail!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_cli_parse_plan() -> Result<()> {
        let args = Cli::parse_from(["claimstar", "plan"]);
        match args.command {
            Commands::Plan { select } => {
                assert!(select.is_empty());
                Ok(())
            }
            _ => bail!("Expected Plan command"),
        }
    }
}
