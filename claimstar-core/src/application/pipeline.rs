// claimstar-core/src/application/pipeline.rs

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::application::steps::{BuildStep, Stage, registry};
use crate::application::warehouse::{BuildContext, Warehouse};
use crate::domain::error::DomainError;
use crate::domain::graph::GraphSolver;
use crate::domain::raw::RawCollections;
use crate::domain::table::Table;
use crate::error::ClaimstarError;
use crate::infrastructure::config::ProjectConfig;
use crate::infrastructure::fs::write_json;
use crate::infrastructure::ingest::load_raw_collections;
use crate::ports::connector::{ColumnSchema, Connector};

pub const RUN_RESULTS_FILE: &str = "run_results.json";

/// Tables of one layer persisted concurrently.
const MAX_PARALLEL_WRITES: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltTable {
    pub name: String,
    pub stage: Stage,
    pub rows: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub success: bool,
    pub started_at: String,
    pub duration_secs: f64,
    /// In build order.
    pub tables: Vec<BuiltTable>,
    pub errors: Vec<String>,
}

/// Loads the raw sources of a project and builds its warehouse.
pub async fn run_project(
    project_dir: &Path,
    config: &ProjectConfig,
    connector: &dyn Connector,
    select: &[String],
) -> Result<RunResult, ClaimstarError> {
    let raw = load_raw_collections(project_dir, config)?;
    let today = Utc::now().date_naive();
    let context = BuildContext::new(config.as_of_date(), config.fallback_date_range(today));
    run_pipeline(
        connector,
        raw,
        context,
        &config.target_dir(project_dir),
        select,
    )
    .await
}

/// Builds the selected tables (all of them when `select` is empty) plus
/// everything upstream, layer by layer.
///
/// Each layer is computed in memory, then its tables are replaced in the store
/// concurrently, re-read for schema drift and checked for integrity. The first
/// failure stops the run; `run_results.json` is written either way.
#[instrument(skip(connector, raw, context, target_dir))]
pub async fn run_pipeline(
    connector: &dyn Connector,
    raw: RawCollections,
    context: BuildContext,
    target_dir: &Path,
    select: &[String],
) -> Result<RunResult, ClaimstarError> {
    let started_at = Utc::now();
    let clock = Instant::now();

    let steps = registry();
    let layers = GraphSolver::plan_selection(&steps, select)?;
    let total: usize = layers.iter().map(Vec::len).sum();
    info!(
        engine = connector.engine_name(),
        tables = total,
        layers = layers.len(),
        "Execution plan ready"
    );

    let mut warehouse = Warehouse::new(raw, context);
    let mut built = Vec::with_capacity(total);
    let outcome = execute_layers(connector, &steps, &layers, &mut warehouse, &mut built).await;

    if outcome.is_ok()
        && let Err(e) = connector.execute("CHECKPOINT").await
    {
        warn!(error = %e, "Checkpoint failed");
    }

    let result = RunResult {
        success: outcome.is_ok(),
        started_at: started_at.to_rfc3339(),
        duration_secs: clock.elapsed().as_secs_f64(),
        tables: built,
        errors: outcome.as_ref().err().map(|e| vec![e.to_string()]).unwrap_or_default(),
    };
    write_json(target_dir.join(RUN_RESULTS_FILE), &result)?;

    outcome?;
    info!(
        tables = result.tables.len(),
        seconds = format!("{:.2}", result.duration_secs),
        "Warehouse built"
    );
    Ok(result)
}

async fn execute_layers(
    connector: &dyn Connector,
    steps: &[BuildStep],
    layers: &[Vec<String>],
    warehouse: &mut Warehouse,
    built: &mut Vec<BuiltTable>,
) -> Result<(), ClaimstarError> {
    for (i, layer) in layers.iter().enumerate() {
        info!(layer = i + 1, tables = layer.len(), "Executing layer");

        // Steps of one layer only read earlier layers, so they build in order
        // against the shared working set.
        let mut tables: Vec<(&BuildStep, Table)> = Vec::with_capacity(layer.len());
        for name in layer {
            let step = steps
                .iter()
                .find(|s| s.name == name.as_str())
                .ok_or_else(|| DomainError::StepNotFound(name.clone()))?;
            let table = (step.build)(warehouse)?;
            debug!(table = step.name, rows = table.row_count(), "Built in memory");
            tables.push((step, table));
        }

        let writes = tables
            .iter()
            .enumerate()
            .map(|(pos, (step, table))| async move {
                let rows = persist(connector, step, table).await;
                (pos, step, rows)
            });
        let mut results: Vec<_> = futures::stream::iter(writes)
            .buffer_unordered(MAX_PARALLEL_WRITES)
            .collect()
            .await;
        results.sort_by_key(|(pos, _, _)| *pos);

        for (_, step, rows) in results {
            let rows = rows?;
            info!(table = step.name, stage = %step.stage, rows, "Table materialized");
            built.push(BuiltTable {
                name: step.name.to_string(),
                stage: step.stage,
                rows,
            });
        }
    }
    Ok(())
}

/// Replace, then verify what the store actually holds.
async fn persist(
    connector: &dyn Connector,
    step: &BuildStep,
    table: &Table,
) -> Result<u64, ClaimstarError> {
    let rows = connector.replace_table(table).await?;
    verify_schema(connector, table).await?;

    for check in step.checks {
        let violations = connector
            .query_scalar(&check.violations_sql(&table.name))
            .await?;
        if violations > 0 {
            return Err(DomainError::IntegrityViolation {
                table: table.name.clone(),
                check: check.name(),
                violations,
            }
            .into());
        }
        debug!(table = %table.name, check = %check.name(), "Check passed");
    }
    Ok(rows)
}

fn describe_column(name: &str, data_type: &str, nullable: bool) -> String {
    let not_null = if nullable { "" } else { " NOT NULL" };
    format!("{} {}{}", name, data_type, not_null)
}

async fn verify_schema(connector: &dyn Connector, table: &Table) -> Result<(), ClaimstarError> {
    let actual: Vec<ColumnSchema> = connector.fetch_columns(&table.name).await?;

    let expected: Vec<String> = table
        .columns
        .iter()
        .map(|c| describe_column(c.name, &c.data_type.reported_name(), c.nullable))
        .collect();
    let actual: Vec<String> = actual
        .iter()
        .map(|c| describe_column(&c.name, &c.data_type.to_uppercase(), c.is_nullable))
        .collect();

    if expected != actual {
        return Err(DomainError::SchemaDrift {
            table: table.name.clone(),
            expected: expected.join(", "),
            actual: actual.join(", "),
        }
        .into());
    }
    Ok(())
}
