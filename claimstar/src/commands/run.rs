// claimstar/src/commands/run.rs
//
// USE CASE: Build the warehouse.

use std::path::{Path, PathBuf};

use anyhow::Context;
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};
use tracing::info;
use claimstar_core::application::{RunResult, run_project};
use claimstar_core::infrastructure::adapters::DuckDBConnector;
use claimstar_core::infrastructure::config::load_project_config;

pub async fn execute(project_dir: PathBuf, select: Vec<String>) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    let config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    info!(project = %config.name, version = %config.version, "Project loaded");

    // B. Instantiate the DuckDB adapter
    let db_path = config.database_path(&project_dir);
    if db_path != ":memory:"
        && let Some(parent) = Path::new(&db_path).parent()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {:?}", parent))?;
    }
    let connector = DuckDBConnector::new(&db_path)
        .with_context(|| format!("Failed to initialize DuckDB at {}", db_path))?;

    // C. Run the Pipeline (Application Layer)
    match run_project(&project_dir, &config, &connector, &select).await {
        Ok(result) => {
            println!("{}", summary(&result));
            println!(
                "Built {} tables in {:.2?} -> {}",
                result.tables.len(),
                start.elapsed(),
                db_path
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(1);
        }
    }
}

fn summary(result: &RunResult) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Table", "Stage", "Rows"]);
    for built in &result.tables {
        table.add_row(vec![
            Cell::new(&built.name),
            Cell::new(built.stage),
            Cell::new(built.rows).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
