// claimstar-core/src/domain/gold/facts.rs

//! Gold facts. Every reference is a dimension surrogate key; anything that
//! does not resolve becomes the unknown member.

use crate::domain::audit::{AuditStamp, GoldRow, SilverRow, add_audit_columns};
use crate::domain::dimension::DimensionIndex;
use crate::domain::gold::calendar::date_key;
use crate::domain::keys::or_unknown;
use crate::domain::silver::{Claim, ClaimTransaction, Encounter};
use crate::domain::table::{Column, ColumnType, Record, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct FactClaim {
    pub claim_id: Option<String>,
    pub patient_sk: i64,
    pub provider_sk: i64,
    pub claim_start_date_sk: i64,
    pub claim_end_date_sk: i64,
    pub total_outstanding: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactEncounter {
    pub encounter_id: Option<String>,
    pub patient_sk: i64,
    pub provider_sk: i64,
    pub payer_sk: i64,
    pub encounter_type_sk: i64,
    pub encounter_date_sk: i64,
    pub discharge_date_sk: i64,
    pub total_claim_cost: f64,
    pub payer_coverage: f64,
    pub length_of_stay_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactClaimTransaction {
    pub transaction_id: Option<String>,
    pub claim_id: Option<String>,
    pub patient_sk: i64,
    pub provider_sk: i64,
    pub transaction_date_sk: i64,
    pub procedure_sk: i64,
    pub transaction_amount: f64,
}

fn date_sk(dates: &DimensionIndex, date: Option<chrono::NaiveDate>) -> i64 {
    dates.resolve(Some(date_key(date).as_str()))
}

pub fn build_fact_claims(
    claims: &[SilverRow<Claim>],
    dates: &DimensionIndex,
    stamp: AuditStamp,
) -> Vec<GoldRow<FactClaim>> {
    let rows = claims
        .iter()
        .map(|c| FactClaim {
            claim_id: c.claim_id.clone(),
            patient_sk: or_unknown(c.patient_sk),
            provider_sk: or_unknown(c.provider_sk),
            claim_start_date_sk: date_sk(dates, c.claim_start_date),
            claim_end_date_sk: date_sk(dates, c.claim_end_date),
            total_outstanding: c.total_outstanding,
        })
        .collect();
    add_audit_columns(rows, stamp)
}

pub fn build_fact_encounters(
    encounters: &[SilverRow<Encounter>],
    dates: &DimensionIndex,
    encounter_types: &DimensionIndex,
    stamp: AuditStamp,
) -> Vec<GoldRow<FactEncounter>> {
    let rows = encounters
        .iter()
        .map(|e| FactEncounter {
            encounter_id: e.encounter_id.clone(),
            patient_sk: or_unknown(e.patient_sk),
            provider_sk: or_unknown(e.provider_sk),
            payer_sk: or_unknown(e.payer_sk),
            encounter_type_sk: encounter_types.resolve(Some(e.encounter_type.as_str())),
            encounter_date_sk: date_sk(dates, e.encounter_date),
            discharge_date_sk: date_sk(dates, e.discharge_date),
            total_claim_cost: e.total_claim_cost,
            payer_coverage: e.payer_coverage,
            length_of_stay_days: e.length_of_stay_days,
        })
        .collect();
    add_audit_columns(rows, stamp)
}

pub fn build_fact_claim_transactions(
    transactions: &[SilverRow<ClaimTransaction>],
    dates: &DimensionIndex,
    procedures: &DimensionIndex,
    stamp: AuditStamp,
) -> Vec<GoldRow<FactClaimTransaction>> {
    let rows = transactions
        .iter()
        .map(|t| FactClaimTransaction {
            transaction_id: t.transaction_id.clone(),
            claim_id: t.claim_id.clone(),
            patient_sk: or_unknown(t.patient_sk),
            provider_sk: or_unknown(t.provider_sk),
            transaction_date_sk: date_sk(dates, t.transaction_date),
            procedure_sk: procedures.resolve(Some(t.procedure_code.as_str())),
            transaction_amount: t.transaction_amount,
        })
        .collect();
    add_audit_columns(rows, stamp)
}

impl Record for FactClaim {
    fn columns() -> Vec<Column> {
        vec![
            Column::nullable("claim_id", ColumnType::Varchar(50)),
            Column::required("patient_sk", ColumnType::BigInt),
            Column::required("provider_sk", ColumnType::BigInt),
            Column::required("claim_start_date_sk", ColumnType::BigInt),
            Column::required("claim_end_date_sk", ColumnType::BigInt),
            Column::nullable("total_outstanding", ColumnType::Decimal(10, 2)),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.claim_id.clone().into(),
            self.patient_sk.into(),
            self.provider_sk.into(),
            self.claim_start_date_sk.into(),
            self.claim_end_date_sk.into(),
            self.total_outstanding.into(),
        ]
    }
}

impl Record for FactEncounter {
    fn columns() -> Vec<Column> {
        vec![
            Column::nullable("encounter_id", ColumnType::Varchar(50)),
            Column::required("patient_sk", ColumnType::BigInt),
            Column::required("provider_sk", ColumnType::BigInt),
            Column::required("payer_sk", ColumnType::BigInt),
            Column::required("encounter_type_sk", ColumnType::BigInt),
            Column::required("encounter_date_sk", ColumnType::BigInt),
            Column::required("discharge_date_sk", ColumnType::BigInt),
            Column::nullable("total_claim_cost", ColumnType::Decimal(10, 2)),
            Column::nullable("payer_coverage", ColumnType::Decimal(10, 2)),
            Column::nullable("length_of_stay_days", ColumnType::SmallInt),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.encounter_id.clone().into(),
            self.patient_sk.into(),
            self.provider_sk.into(),
            self.payer_sk.into(),
            self.encounter_type_sk.into(),
            self.encounter_date_sk.into(),
            self.discharge_date_sk.into(),
            self.total_claim_cost.into(),
            self.payer_coverage.into(),
            self.length_of_stay_days.into(),
        ]
    }
}

impl Record for FactClaimTransaction {
    fn columns() -> Vec<Column> {
        vec![
            Column::nullable("transaction_id", ColumnType::Varchar(50)),
            Column::nullable("claim_id", ColumnType::Varchar(50)),
            Column::required("patient_sk", ColumnType::BigInt),
            Column::required("provider_sk", ColumnType::BigInt),
            Column::required("transaction_date_sk", ColumnType::BigInt),
            Column::required("procedure_sk", ColumnType::BigInt),
            Column::nullable("transaction_amount", ColumnType::Decimal(10, 2)),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.transaction_id.clone().into(),
            self.claim_id.clone().into(),
            self.patient_sk.into(),
            self.provider_sk.into(),
            self.transaction_date_sk.into(),
            self.procedure_sk.into(),
            self.transaction_amount.into(),
        ]
    }
}
