// claimstar-core/src/domain/table.rs

//! Engine-neutral table model handed to the destination store.
//!
//! Every output record type implements [`Record`], which fixes its column set,
//! order, type and nullability. The store never sees a loosely typed row.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    SmallInt,
    Varchar(u16),
    /// precision, scale
    Decimal(u8, u8),
    Date,
    Boolean,
    TimestampTz,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::BigInt => write!(f, "BIGINT"),
            ColumnType::SmallInt => write!(f, "SMALLINT"),
            ColumnType::Varchar(len) => write!(f, "VARCHAR({})", len),
            ColumnType::Decimal(p, s) => write!(f, "DECIMAL({},{})", p, s),
            ColumnType::Date => write!(f, "DATE"),
            ColumnType::Boolean => write!(f, "BOOLEAN"),
            ColumnType::TimestampTz => write!(f, "TIMESTAMPTZ"),
        }
    }
}

impl ColumnType {
    /// The type name the store reports back for a column declared as `self`.
    /// Length limits on text are not reported.
    pub fn reported_name(&self) -> String {
        match self {
            ColumnType::Varchar(_) => "VARCHAR".to_string(),
            ColumnType::TimestampTz => "TIMESTAMP WITH TIME ZONE".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub data_type: ColumnType,
    pub nullable: bool,
}

impl Column {
    pub const fn nullable(name: &'static str, data_type: ColumnType) -> Self {
        Self {
            name,
            data_type,
            nullable: true,
        }
    }

    pub const fn required(name: &'static str, data_type: ColumnType) -> Self {
        Self {
            name,
            data_type,
            nullable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    Decimal(f64),
    Timestamp(DateTime<Utc>),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A typed output row with a fixed column layout.
pub trait Record {
    fn columns() -> Vec<Column>;
    /// One value per column, in `columns()` order.
    fn values(&self) -> Vec<Value>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn from_records<R: Record>(name: &str, records: &[R]) -> Self {
        Self {
            name: name.to_string(),
            columns: R::columns(),
            rows: records.iter().map(Record::values).collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// `CREATE OR REPLACE TABLE` with the explicit column-type schema.
    pub fn create_ddl(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(|c| {
                let not_null = if c.nullable { "" } else { " NOT NULL" };
                format!("{} {}{}", quote_ident(c.name), c.data_type, not_null)
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE OR REPLACE TABLE {} ({})", quote_ident(&self.name), cols)
    }

    /// Parameterised insert; every placeholder is cast to its column type so
    /// dates, decimals and timestamps can be bound as text.
    pub fn insert_sql(&self) -> String {
        let placeholders = self
            .columns
            .iter()
            .map(|c| format!("CAST(? AS {})", c.data_type))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} VALUES ({})",
            quote_ident(&self.name),
            placeholders
        )
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Probe {
        id: i64,
        label: Option<String>,
    }

    impl Record for Probe {
        fn columns() -> Vec<Column> {
            vec![
                Column::required("probe_sk", ColumnType::BigInt),
                Column::nullable("label", ColumnType::Varchar(50)),
            ]
        }

        fn values(&self) -> Vec<Value> {
            vec![self.id.into(), self.label.clone().into()]
        }
    }

    #[test]
    fn test_create_ddl_carries_types_and_nullability() {
        let table = Table::from_records::<Probe>("gold_dim_probe", &[]);
        insta::assert_snapshot!(
            table.create_ddl(),
            @r#"CREATE OR REPLACE TABLE "gold_dim_probe" ("probe_sk" BIGINT NOT NULL, "label" VARCHAR(50))"#
        );
    }

    #[test]
    fn test_insert_sql_casts_every_placeholder() {
        let table = Table::from_records::<Probe>("t", &[]);
        assert_eq!(
            table.insert_sql(),
            r#"INSERT INTO "t" VALUES (CAST(? AS BIGINT), CAST(? AS VARCHAR(50)))"#
        );
    }

    #[test]
    fn test_from_records_keeps_row_order() {
        let rows = vec![
            Probe {
                id: 2,
                label: None,
            },
            Probe {
                id: 1,
                label: Some("a".into()),
            },
        ];
        let table = Table::from_records("t", &rows);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0], vec![Value::Int(2), Value::Null]);
        assert_eq!(table.rows[1][1], Value::Text("a".into()));
    }

    #[test]
    fn test_reported_names_match_store_catalog() {
        assert_eq!(ColumnType::Varchar(255).reported_name(), "VARCHAR");
        assert_eq!(ColumnType::Decimal(10, 2).reported_name(), "DECIMAL(10,2)");
        assert_eq!(
            ColumnType::TimestampTz.reported_name(),
            "TIMESTAMP WITH TIME ZONE"
        );
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
    }
}
