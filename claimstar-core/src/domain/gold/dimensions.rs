// claimstar-core/src/domain/gold/dimensions.rs

//! Gold dimensions. Conformed entities keep their Silver surrogate keys and
//! audit columns; their natural-key column is renamed `<entity>_natural_key`.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::audit::{AuditStamp, GoldRow, SilverRow, add_audit_columns};
use crate::domain::dimension::{
    Dimension, GenericDimension, add_unknown_member, build_generic_dimension, describe, humanize,
    unknown,
};
use crate::domain::silver::{ClaimTransaction, Encounter, Patient, Payer, Provider};
use crate::domain::table::{Column, ColumnType, Record, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct DimPatient {
    pub patient_sk: i64,
    pub patient_natural_key: String,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i64>,
    pub age_group: String,
    pub dw_created_at: Option<DateTime<Utc>>,
    pub dw_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimProvider {
    pub provider_sk: i64,
    pub provider_natural_key: String,
    pub provider_name: String,
    pub dw_created_at: Option<DateTime<Utc>>,
    pub dw_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimPayer {
    pub payer_sk: i64,
    pub payer_natural_key: String,
    pub payer_name: String,
    pub dw_created_at: Option<DateTime<Utc>>,
    pub dw_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimProcedure {
    pub procedure_sk: i64,
    pub procedure_code: String,
    pub procedure_description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimEncounterType {
    pub encounter_type_sk: i64,
    pub encounter_type: String,
}

impl Dimension for DimPatient {
    fn surrogate_key(&self) -> i64 {
        self.patient_sk
    }

    fn natural_key(&self) -> &str {
        &self.patient_natural_key
    }

    fn unknown_member(surrogate_key: i64, natural_key: &str) -> Self {
        Self {
            patient_sk: surrogate_key,
            patient_natural_key: natural_key.to_string(),
            full_name: "Unknown Patient".to_string(),
            date_of_birth: unknown(),
            age: unknown(),
            age_group: "Unknown".to_string(),
            dw_created_at: unknown(),
            dw_updated_at: unknown(),
        }
    }
}

impl Dimension for DimProvider {
    fn surrogate_key(&self) -> i64 {
        self.provider_sk
    }

    fn natural_key(&self) -> &str {
        &self.provider_natural_key
    }

    fn unknown_member(surrogate_key: i64, natural_key: &str) -> Self {
        Self {
            provider_sk: surrogate_key,
            provider_natural_key: natural_key.to_string(),
            provider_name: "Unknown Provider".to_string(),
            dw_created_at: unknown(),
            dw_updated_at: unknown(),
        }
    }
}

impl Dimension for DimPayer {
    fn surrogate_key(&self) -> i64 {
        self.payer_sk
    }

    fn natural_key(&self) -> &str {
        &self.payer_natural_key
    }

    fn unknown_member(surrogate_key: i64, natural_key: &str) -> Self {
        Self {
            payer_sk: surrogate_key,
            payer_natural_key: natural_key.to_string(),
            payer_name: "Unknown Payer".to_string(),
            dw_created_at: unknown(),
            dw_updated_at: unknown(),
        }
    }
}

impl Dimension for DimProcedure {
    fn surrogate_key(&self) -> i64 {
        self.procedure_sk
    }

    fn natural_key(&self) -> &str {
        &self.procedure_code
    }

    fn unknown_member(surrogate_key: i64, natural_key: &str) -> Self {
        Self {
            procedure_sk: surrogate_key,
            procedure_code: natural_key.to_string(),
            procedure_description: format!("Unknown {}", humanize(Self::SOURCE_COLUMN)),
        }
    }
}

impl GenericDimension for DimProcedure {
    const SOURCE_COLUMN: &'static str = "procedure_code";

    fn from_code(surrogate_key: i64, code: String) -> Self {
        Self {
            procedure_sk: surrogate_key,
            procedure_description: describe(Self::SOURCE_COLUMN, &code),
            procedure_code: code,
        }
    }
}

impl Dimension for DimEncounterType {
    fn surrogate_key(&self) -> i64 {
        self.encounter_type_sk
    }

    fn natural_key(&self) -> &str {
        &self.encounter_type
    }

    fn unknown_member(surrogate_key: i64, natural_key: &str) -> Self {
        Self {
            encounter_type_sk: surrogate_key,
            encounter_type: natural_key.to_string(),
        }
    }
}

impl GenericDimension for DimEncounterType {
    const SOURCE_COLUMN: &'static str = "encounter_type";

    fn from_code(surrogate_key: i64, code: String) -> Self {
        Self {
            encounter_type_sk: surrogate_key,
            encounter_type: code,
        }
    }
}

fn finish<D: Dimension>(rows: Vec<D>, stamp: AuditStamp) -> Vec<GoldRow<D>> {
    add_audit_columns(add_unknown_member(rows), stamp)
}

pub fn build_dim_patient(
    patients: &[SilverRow<Patient>],
    stamp: AuditStamp,
) -> Vec<GoldRow<DimPatient>> {
    let rows = patients
        .iter()
        .map(|p| DimPatient {
            patient_sk: p.patient_sk,
            patient_natural_key: p.patient_id.clone(),
            full_name: p.full_name.clone(),
            date_of_birth: p.date_of_birth,
            age: p.age,
            age_group: p.age_group.clone(),
            dw_created_at: Some(p.created_at),
            dw_updated_at: Some(p.updated_at),
        })
        .collect();
    finish(rows, stamp)
}

pub fn build_dim_provider(
    providers: &[SilverRow<Provider>],
    stamp: AuditStamp,
) -> Vec<GoldRow<DimProvider>> {
    let rows = providers
        .iter()
        .map(|p| DimProvider {
            provider_sk: p.provider_sk,
            provider_natural_key: p.provider_id.clone(),
            provider_name: p.provider_name.clone(),
            dw_created_at: Some(p.created_at),
            dw_updated_at: Some(p.updated_at),
        })
        .collect();
    finish(rows, stamp)
}

pub fn build_dim_payer(payers: &[SilverRow<Payer>], stamp: AuditStamp) -> Vec<GoldRow<DimPayer>> {
    let rows = payers
        .iter()
        .map(|p| DimPayer {
            payer_sk: p.payer_sk,
            payer_natural_key: p.payer_id.clone(),
            payer_name: p.payer_name.clone(),
            dw_created_at: Some(p.created_at),
            dw_updated_at: Some(p.updated_at),
        })
        .collect();
    finish(rows, stamp)
}

pub fn build_dim_procedure(
    transactions: &[SilverRow<ClaimTransaction>],
    stamp: AuditStamp,
) -> Vec<GoldRow<DimProcedure>> {
    build_generic_dimension(
        transactions.iter().map(|t| Some(t.procedure_code.as_str())),
        stamp,
    )
}

pub fn build_dim_encounter_type(
    encounters: &[SilverRow<Encounter>],
    stamp: AuditStamp,
) -> Vec<GoldRow<DimEncounterType>> {
    build_generic_dimension(
        encounters.iter().map(|e| Some(e.encounter_type.as_str())),
        stamp,
    )
}

fn silver_audit_columns() -> [Column; 2] {
    [
        Column::nullable("dw_created_at", ColumnType::TimestampTz),
        Column::nullable("dw_updated_at", ColumnType::TimestampTz),
    ]
}

impl Record for DimPatient {
    fn columns() -> Vec<Column> {
        let mut columns = vec![
            Column::required("patient_sk", ColumnType::BigInt),
            Column::required("patient_natural_key", ColumnType::Varchar(50)),
            Column::nullable("full_name", ColumnType::Varchar(255)),
            Column::nullable("date_of_birth", ColumnType::Date),
            Column::nullable("age", ColumnType::SmallInt),
            Column::nullable("age_group", ColumnType::Varchar(20)),
        ];
        columns.extend(silver_audit_columns());
        columns
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.patient_sk.into(),
            (&self.patient_natural_key).into(),
            (&self.full_name).into(),
            self.date_of_birth.into(),
            self.age.into(),
            (&self.age_group).into(),
            self.dw_created_at.into(),
            self.dw_updated_at.into(),
        ]
    }
}

impl Record for DimProvider {
    fn columns() -> Vec<Column> {
        let mut columns = vec![
            Column::required("provider_sk", ColumnType::BigInt),
            Column::required("provider_natural_key", ColumnType::Varchar(50)),
            Column::nullable("provider_name", ColumnType::Varchar(255)),
        ];
        columns.extend(silver_audit_columns());
        columns
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.provider_sk.into(),
            (&self.provider_natural_key).into(),
            (&self.provider_name).into(),
            self.dw_created_at.into(),
            self.dw_updated_at.into(),
        ]
    }
}

impl Record for DimPayer {
    fn columns() -> Vec<Column> {
        let mut columns = vec![
            Column::required("payer_sk", ColumnType::BigInt),
            Column::required("payer_natural_key", ColumnType::Varchar(50)),
            Column::nullable("payer_name", ColumnType::Varchar(255)),
        ];
        columns.extend(silver_audit_columns());
        columns
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.payer_sk.into(),
            (&self.payer_natural_key).into(),
            (&self.payer_name).into(),
            self.dw_created_at.into(),
            self.dw_updated_at.into(),
        ]
    }
}

impl Record for DimProcedure {
    fn columns() -> Vec<Column> {
        vec![
            Column::required("procedure_sk", ColumnType::BigInt),
            Column::required("procedure_code", ColumnType::Varchar(50)),
            Column::nullable("procedure_description", ColumnType::Varchar(255)),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.procedure_sk.into(),
            (&self.procedure_code).into(),
            (&self.procedure_description).into(),
        ]
    }
}

impl Record for DimEncounterType {
    fn columns() -> Vec<Column> {
        vec![
            Column::required("encounter_type_sk", ColumnType::BigInt),
            Column::required("encounter_type", ColumnType::Varchar(50)),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![self.encounter_type_sk.into(), (&self.encounter_type).into()]
    }
}
