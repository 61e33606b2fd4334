// claimstar/src/commands/inspect.rs
//
// USE CASE: Inspect a built table (schema + sample rows).

use std::path::{Path, PathBuf};

use anyhow::Context;
use comfy_table::{Table, presets::UTF8_FULL};
use duckdb::{AccessMode, Config, Connection, Row};
use claimstar_core::application::registry;
use claimstar_core::domain::table::quote_ident;
use claimstar_core::infrastructure::config::load_project_config;

pub fn execute(project_dir: PathBuf, table: String, limit: usize) -> anyhow::Result<()> {
    let config = load_project_config(&project_dir)?;
    let db_path = config.database_path(&project_dir);
    if !Path::new(&db_path).exists() {
        anyhow::bail!(
            "Database not found at: {}\nHave you run 'claimstar run'?",
            db_path
        );
    }

    if !registry().iter().any(|s| s.name == table.as_str()) {
        anyhow::bail!(
            "'{}' is not a warehouse table. Run 'claimstar plan' to list them.",
            table
        );
    }

    let conn = Connection::open_with_flags(
        &db_path,
        Config::default().access_mode(AccessMode::ReadOnly)?,
    )
    .with_context(|| format!("Failed to open {}", db_path))?;

    // Schema
    let mut stmt_cols = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let columns: Vec<(String, String, bool)> = stmt_cols
        .query_map([], |row: &Row| {
            Ok((
                row.get::<_, String>("name")?,
                row.get::<_, String>("type")?,
                row.get::<_, bool>("notnull")?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        anyhow::bail!("Table '{}' has not been built yet", table);
    }

    let mut schema = Table::new();
    schema.load_preset(UTF8_FULL);
    schema.set_header(vec!["Column", "Type", "Nullable"]);
    for (name, data_type, not_null) in &columns {
        schema.add_row(vec![
            name.clone(),
            data_type.clone(),
            if *not_null { "NO" } else { "YES" }.to_string(),
        ]);
    }
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_ident(&table)),
        [],
        |row| row.get(0),
    )?;
    println!("{} ({} rows)\n{schema}", table, total);

    // Sample rows, rendered as text by the engine
    let projection = columns
        .iter()
        .map(|(name, _, _)| format!("CAST({} AS VARCHAR)", quote_ident(name)))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} LIMIT {}",
        projection,
        quote_ident(&table),
        limit
    ))?;
    let mut rows = stmt.query([])?;

    let mut sample = Table::new();
    sample.load_preset(UTF8_FULL);
    sample.set_header(columns.iter().map(|(name, _, _)| name.clone()));
    while let Some(row) = rows.next()? {
        let values = (0..columns.len())
            .map(|i| {
                row.get::<_, Option<String>>(i)
                    .map(|v| v.unwrap_or_else(|| "NULL".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        sample.add_row(values);
    }
    println!("{sample}");

    Ok(())
}
