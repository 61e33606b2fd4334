// claimstar-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::types::Value as SqlValue;
use duckdb::{Config, Connection, params_from_iter};
use regex::Regex;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::debug;

use crate::domain::table::{Table, Value};
use crate::error::ClaimstarError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::{ColumnSchema, Connector};

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

/// Table and column names are interpolated into SQL, so only plain identifiers pass.
fn checked_identifier(name: &str) -> Result<&str, ClaimstarError> {
    if identifier_re().is_match(name) {
        Ok(name)
    } else {
        Err(InfrastructureError::Database(DatabaseError::UnsafeIdentifier(name.to_string())).into())
    }
}

/// Dates, money and timestamps travel as text and are cast by the INSERT.
fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Int(v) => SqlValue::BigInt(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Bool(v) => SqlValue::Boolean(*v),
        Value::Date(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
        Value::Decimal(v) => SqlValue::Text(format!("{:.2}", v)),
        Value::Timestamp(ts) => SqlValue::Text(ts.to_rfc3339()),
    }
}

pub struct DuckDBConnector {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDBConnector {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ClaimstarError> {
        self.conn.lock().map_err(|_| {
            ClaimstarError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
                "warehouse connection lock poisoned",
            )))
        })
    }
}

#[async_trait]
impl Connector for DuckDBConnector {
    async fn execute(&self, query: &str) -> Result<(), ClaimstarError> {
        let conn = self.lock()?;
        conn.execute_batch(query)?;
        Ok(())
    }

    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, ClaimstarError> {
        let table_name = checked_identifier(table_name)?;
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table_name))?;
        let rows = stmt.query_map([], |row| {
            Ok(ColumnSchema {
                name: row.get("name")?,
                data_type: row.get("type")?,
                is_nullable: !row.get::<_, bool>("notnull")?,
            })
        })?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row?);
        }
        Ok(columns)
    }

    async fn replace_table(&self, table: &Table) -> Result<u64, ClaimstarError> {
        checked_identifier(&table.name)?;
        for column in &table.columns {
            checked_identifier(column.name)?;
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute_batch(&table.create_ddl())?;

        let mut written: u64 = 0;
        {
            let mut stmt = tx.prepare(&table.insert_sql())?;
            for row in &table.rows {
                stmt.execute(params_from_iter(row.iter().map(to_sql_value)))?;
                written += 1;
            }
        }
        tx.commit()?;

        debug!(table = %table.name, rows = written, "Table replaced");
        Ok(written)
    }

    async fn query_scalar(&self, query: &str) -> Result<i64, ClaimstarError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query)?;
        let mut rows = stmt.query([])?;

        let row = rows
            .next()?
            .ok_or_else(|| ClaimstarError::InternalError("No scalar value returned".into()))?;
        let value: i64 = row.get(0)?;
        Ok(value)
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}
