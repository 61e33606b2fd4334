// claimstar-core/src/domain/audit.rs

use chrono::{DateTime, SubsecRound, Utc};
use std::marker::PhantomData;
use std::ops::Deref;

use crate::domain::table::{Column, ColumnType, Record, Value};

/// Names the pair of audit columns a warehouse stage stamps on its rows.
pub trait AuditStage {
    const CREATED_AT: &'static str;
    const UPDATED_AT: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Silver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gold;

impl AuditStage for Silver {
    const CREATED_AT: &'static str = "dw_created_at";
    const UPDATED_AT: &'static str = "dw_updated_at";
}

impl AuditStage for Gold {
    const CREATED_AT: &'static str = "dw_gold_created_at";
    const UPDATED_AT: &'static str = "dw_gold_updated_at";
}

/// Wall-clock instant of the run, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditStamp {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuditStamp {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        let instant = instant.trunc_subsecs(0);
        Self {
            created_at: instant,
            updated_at: instant,
        }
    }
}

/// A row plus the audit columns of stage `S`.
#[derive(Debug, Clone, PartialEq)]
pub struct Audited<T, S> {
    pub row: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    stage: PhantomData<S>,
}

pub type SilverRow<T> = Audited<T, Silver>;
pub type GoldRow<T> = Audited<T, Gold>;

impl<T, S> Audited<T, S> {
    pub fn new(row: T, stamp: AuditStamp) -> Self {
        Self {
            row,
            created_at: stamp.created_at,
            updated_at: stamp.updated_at,
            stage: PhantomData,
        }
    }
}

impl<T, S> Deref for Audited<T, S> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.row
    }
}

pub fn add_audit_columns<T, S>(rows: Vec<T>, stamp: AuditStamp) -> Vec<Audited<T, S>> {
    rows.into_iter().map(|row| Audited::new(row, stamp)).collect()
}

impl<T: Record, S: AuditStage> Record for Audited<T, S> {
    fn columns() -> Vec<Column> {
        let mut columns = T::columns();
        columns.push(Column::required(S::CREATED_AT, ColumnType::TimestampTz));
        columns.push(Column::required(S::UPDATED_AT, ColumnType::TimestampTz));
        columns
    }

    fn values(&self) -> Vec<Value> {
        let mut values = self.row.values();
        values.push(self.created_at.into());
        values.push(self.updated_at.into());
        values
    }
}
