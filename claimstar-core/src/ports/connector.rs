// claimstar-core/src/ports/connector.rs

// What the pipeline needs from a destination store, without knowing which one.

use crate::domain::table::Table;
use crate::error::ClaimstarError;
use async_trait::async_trait;

/// A column as reported back by the store.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn execute(&self, query: &str) -> Result<(), ClaimstarError>;

    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, ClaimstarError>;

    /// Full destructive replace of one table: schema and rows land together or not at all.
    /// Returns the number of rows written.
    async fn replace_table(&self, table: &Table) -> Result<u64, ClaimstarError>;

    async fn query_scalar(&self, query: &str) -> Result<i64, ClaimstarError>;

    fn engine_name(&self) -> &str;
}
