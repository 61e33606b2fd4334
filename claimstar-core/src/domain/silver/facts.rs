// claimstar-core/src/domain/silver/facts.rs

//! Conformed fact-like entities. Each one carries the surrogate keys of the
//! conformed dimensions it references; an unresolved reference stays `None`.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::audit::{AuditStamp, SilverRow, add_audit_columns};
use crate::domain::keys::natural_key;
use crate::domain::raw::{RawClaim, RawClaimTransaction, RawEncounter};
use crate::domain::silver::NaturalKeyIndex;
use crate::domain::silver::coerce::{
    bound_amount, clean_text, length_of_stay, parse_amount, parse_date, resolve_end_date, title_case,
};
use crate::domain::table::{Column, ColumnType, Record, Value};

pub const UNKNOWN_PROCEDURE_CODE: &str = "UNKNOWN_CODE";
pub const UNKNOWN_ENCOUNTER_TYPE: &str = "Unknown Type";

#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub claim_id: Option<String>,
    pub patient_sk: Option<i64>,
    pub provider_sk: Option<i64>,
    pub claim_start_date: Option<NaiveDate>,
    pub claim_end_date: Option<NaiveDate>,
    pub total_outstanding: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimTransaction {
    pub transaction_id: Option<String>,
    pub claim_id: Option<String>,
    pub patient_sk: Option<i64>,
    pub provider_sk: Option<i64>,
    pub transaction_date: Option<NaiveDate>,
    pub transaction_amount: f64,
    pub procedure_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Encounter {
    pub encounter_id: Option<String>,
    pub patient_sk: Option<i64>,
    pub provider_sk: Option<i64>,
    pub payer_sk: Option<i64>,
    pub encounter_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub encounter_type: String,
    pub total_claim_cost: f64,
    pub payer_coverage: f64,
    pub length_of_stay_days: Option<i64>,
}

fn report_unresolved(entity: &str, reference: &str, total: usize) {
    if total > 0 {
        warn!(entity, reference, rows = total, "Unresolved references left null");
    }
}

fn count_missing<T>(rows: &[T], key: impl Fn(&T) -> Option<i64>) -> usize {
    rows.iter().filter(|r| key(r).is_none()).count()
}

pub fn transform_claims(
    raw: &[RawClaim],
    patients: &NaturalKeyIndex,
    providers: &NaturalKeyIndex,
    stamp: AuditStamp,
) -> Vec<SilverRow<Claim>> {
    let mut inverted = 0usize;
    let claims: Vec<Claim> = raw
        .iter()
        .map(|row| {
            let start = parse_date(row.claim_start_date.as_deref());
            let end = parse_date(row.claim_end_date.as_deref());
            let claim_end_date = resolve_end_date(start, end);
            if claim_end_date != end {
                inverted += 1;
            }
            let total_outstanding = [
                &row.outstanding_primary,
                &row.outstanding_secondary,
                &row.outstanding_patient,
            ]
            .into_iter()
            .map(|v| parse_amount(v.as_deref()))
            .sum::<f64>();
            let total_outstanding = bound_amount(total_outstanding);

            Claim {
                claim_id: natural_key(row.claim_id.as_deref()),
                patient_sk: patients.lookup(row.patient_id.as_deref()),
                provider_sk: providers.lookup(row.provider_id.as_deref()),
                claim_start_date: start,
                claim_end_date,
                total_outstanding,
            }
        })
        .collect();

    if inverted > 0 {
        warn!(rows = inverted, "Claim end dates before their start dropped");
    }
    report_unresolved("claims", "patient", count_missing(&claims, |c| c.patient_sk));
    report_unresolved("claims", "provider", count_missing(&claims, |c| c.provider_sk));
    debug!(entity = "claims", rows = claims.len(), "Conformed");
    add_audit_columns(claims, stamp)
}

pub fn transform_claim_transactions(
    raw: &[RawClaimTransaction],
    patients: &NaturalKeyIndex,
    providers: &NaturalKeyIndex,
    stamp: AuditStamp,
) -> Vec<SilverRow<ClaimTransaction>> {
    let transactions: Vec<ClaimTransaction> = raw
        .iter()
        .map(|row| ClaimTransaction {
            transaction_id: natural_key(row.transaction_id.as_deref()),
            claim_id: natural_key(row.claim_id.as_deref()),
            patient_sk: patients.lookup(row.patient_id.as_deref()),
            provider_sk: providers.lookup(row.provider_id.as_deref()),
            transaction_date: parse_date(row.transaction_date.as_deref()),
            transaction_amount: parse_amount(row.transaction_amount.as_deref()),
            procedure_code: clean_text(row.procedure_code.as_deref())
                .map(|s| s.to_uppercase())
                .unwrap_or_else(|| UNKNOWN_PROCEDURE_CODE.to_string()),
        })
        .collect();

    report_unresolved(
        "claim_transactions",
        "patient",
        count_missing(&transactions, |t| t.patient_sk),
    );
    report_unresolved(
        "claim_transactions",
        "provider",
        count_missing(&transactions, |t| t.provider_sk),
    );
    debug!(entity = "claim_transactions", rows = transactions.len(), "Conformed");
    add_audit_columns(transactions, stamp)
}

pub fn transform_encounters(
    raw: &[RawEncounter],
    patients: &NaturalKeyIndex,
    providers: &NaturalKeyIndex,
    payers: &NaturalKeyIndex,
    stamp: AuditStamp,
) -> Vec<SilverRow<Encounter>> {
    let encounters: Vec<Encounter> = raw
        .iter()
        .map(|row| {
            let start = parse_date(row.encounter_date.as_deref());
            let end = parse_date(row.discharge_date.as_deref());
            Encounter {
                encounter_id: natural_key(row.encounter_id.as_deref()),
                patient_sk: patients.lookup(row.patient_id.as_deref()),
                provider_sk: providers.lookup(row.provider_id.as_deref()),
                payer_sk: payers.lookup(row.payer_id.as_deref()),
                encounter_date: start,
                discharge_date: resolve_end_date(start, end),
                encounter_type: clean_text(row.encounter_type.as_deref())
                    .map(|s| title_case(&s))
                    .unwrap_or_else(|| UNKNOWN_ENCOUNTER_TYPE.to_string()),
                total_claim_cost: parse_amount(row.total_claim_cost.as_deref()),
                payer_coverage: parse_amount(row.payer_coverage.as_deref()),
                // Measured on the parsed dates: an inverted stay is 0 days even
                // though its discharge date is dropped.
                length_of_stay_days: length_of_stay(start, end),
            }
        })
        .collect();

    report_unresolved("encounters", "patient", count_missing(&encounters, |e| e.patient_sk));
    report_unresolved("encounters", "provider", count_missing(&encounters, |e| e.provider_sk));
    report_unresolved("encounters", "payer", count_missing(&encounters, |e| e.payer_sk));
    debug!(entity = "encounters", rows = encounters.len(), "Conformed");
    add_audit_columns(encounters, stamp)
}

impl Record for Claim {
    fn columns() -> Vec<Column> {
        vec![
            Column::nullable("claim_id", ColumnType::Varchar(50)),
            Column::nullable("patient_sk", ColumnType::BigInt),
            Column::nullable("provider_sk", ColumnType::BigInt),
            Column::nullable("claim_start_date", ColumnType::Date),
            Column::nullable("claim_end_date", ColumnType::Date),
            Column::nullable("total_outstanding", ColumnType::Decimal(10, 2)),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.claim_id.clone().into(),
            self.patient_sk.into(),
            self.provider_sk.into(),
            self.claim_start_date.into(),
            self.claim_end_date.into(),
            self.total_outstanding.into(),
        ]
    }
}

impl Record for ClaimTransaction {
    fn columns() -> Vec<Column> {
        vec![
            Column::nullable("transaction_id", ColumnType::Varchar(50)),
            Column::nullable("claim_id", ColumnType::Varchar(50)),
            Column::nullable("patient_sk", ColumnType::BigInt),
            Column::nullable("provider_sk", ColumnType::BigInt),
            Column::nullable("transaction_date", ColumnType::Date),
            Column::nullable("transaction_amount", ColumnType::Decimal(10, 2)),
            Column::nullable("procedure_code", ColumnType::Varchar(50)),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.transaction_id.clone().into(),
            self.claim_id.clone().into(),
            self.patient_sk.into(),
            self.provider_sk.into(),
            self.transaction_date.into(),
            self.transaction_amount.into(),
            (&self.procedure_code).into(),
        ]
    }
}

impl Record for Encounter {
    fn columns() -> Vec<Column> {
        vec![
            Column::nullable("encounter_id", ColumnType::Varchar(50)),
            Column::nullable("patient_sk", ColumnType::BigInt),
            Column::nullable("provider_sk", ColumnType::BigInt),
            Column::nullable("payer_sk", ColumnType::BigInt),
            Column::nullable("encounter_date", ColumnType::Date),
            Column::nullable("discharge_date", ColumnType::Date),
            Column::nullable("encounter_type", ColumnType::Varchar(50)),
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
            self.encounter_date.into(),
            self.discharge_date.into(),
            (&self.encounter_type).into(),
            self.total_claim_cost.into(),
            self.payer_coverage.into(),
            self.length_of_stay_days.into(),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn index(pairs: &[(&str, i64)]) -> NaturalKeyIndex {
        NaturalKeyIndex::new(pairs.iter().copied())
    }

    #[test]
    fn test_claim_amounts_dates_and_joins() {
        let raw = vec![RawClaim {
            claim_id: s("C1"),
            patient_id: s("P1"),
            provider_id: s("PR9"),
            claim_start_date: s("2024-06-10"),
            claim_end_date: s("2024-06-01"),
            outstanding_primary: s("10.50"),
            outstanding_secondary: s("abc"),
            outstanding_patient: s("4.25"),
        }];
        let rows = transform_claims(
            &raw,
            &index(&[("P1", 1)]),
            &index(&[("PR1", 1)]),
            AuditStamp::now(),
        );
        let claim = &rows[0];
        assert_eq!(claim.claim_start_date, Some(d(2024, 6, 10)));
        assert_eq!(claim.claim_end_date, None, "end before start is dropped");
        assert!((claim.total_outstanding - 14.75).abs() < 1e-9);
        assert_eq!(claim.patient_sk, Some(1));
        assert_eq!(claim.provider_sk, None);
    }

    #[test]
    fn test_transaction_code_normalised() {
        let raw = vec![
            RawClaimTransaction {
                transaction_id: s("T1"),
                procedure_code: s(" 99213a "),
                transaction_amount: s("-5"),
                ..RawClaimTransaction::default()
            },
            RawClaimTransaction {
                transaction_id: s("T2"),
                procedure_code: s("   "),
                ..RawClaimTransaction::default()
            },
        ];
        let rows = transform_claim_transactions(
            &raw,
            &NaturalKeyIndex::default(),
            &NaturalKeyIndex::default(),
            AuditStamp::now(),
        );
        assert_eq!(rows[0].procedure_code, "99213A");
        assert_eq!(rows[0].transaction_amount, -5.0);
        assert_eq!(rows[1].procedure_code, "UNKNOWN_CODE");
        assert_eq!(rows[1].transaction_amount, 0.0);
        assert_eq!(rows[1].patient_sk, None);
    }

    #[test]
    fn test_inverted_encounter_keeps_zero_stay() {
        let raw = vec![
            RawEncounter {
                encounter_id: s("E1"),
                payer_id: s("PAY1"),
                encounter_date: s("2024-05-10"),
                discharge_date: s("2024-05-08"),
                encounter_type: s("inpatient"),
                ..RawEncounter::default()
            },
            RawEncounter {
                encounter_id: s("E2"),
                encounter_date: s("2024-05-01"),
                discharge_date: s("2024-05-04"),
                total_claim_cost: s("100"),
                payer_coverage: s("80.5"),
                ..RawEncounter::default()
            },
        ];
        let rows = transform_encounters(
            &raw,
            &NaturalKeyIndex::default(),
            &NaturalKeyIndex::default(),
            &index(&[("PAY1", 7)]),
            AuditStamp::now(),
        );
        assert_eq!(rows[0].discharge_date, None);
        assert_eq!(rows[0].length_of_stay_days, Some(0));
        assert_eq!(rows[0].encounter_type, "Inpatient");
        assert_eq!(rows[0].payer_sk, Some(7));

        assert_eq!(rows[1].length_of_stay_days, Some(3));
        assert_eq!(rows[1].encounter_type, "Unknown Type");
        assert_eq!(rows[1].payer_coverage, 80.5);
    }

    #[test]
    fn test_values_the_columns_cannot_hold_are_coerced() {
        let raw = vec![RawEncounter {
            encounter_id: s("E9"),
            encounter_date: s("1900-01-01"),
            discharge_date: s("2024-01-01"),
            total_claim_cost: s("250000000"),
            payer_coverage: s("12.5"),
            ..RawEncounter::default()
        }];
        let rows = transform_encounters(
            &raw,
            &NaturalKeyIndex::default(),
            &NaturalKeyIndex::default(),
            &NaturalKeyIndex::default(),
            AuditStamp::now(),
        );
        assert_eq!(rows[0].encounter_date, Some(d(1900, 1, 1)));
        assert_eq!(rows[0].length_of_stay_days, None);
        assert_eq!(rows[0].total_claim_cost, 0.0);
        assert_eq!(rows[0].payer_coverage, 12.5);

        let claims = transform_claims(
            &[RawClaim {
                claim_id: s("C9"),
                claim_end_date: s("9999-12-31"),
                outstanding_primary: s("60000000"),
                outstanding_secondary: s("60000000"),
                ..RawClaim::default()
            }],
            &NaturalKeyIndex::default(),
            &NaturalKeyIndex::default(),
            AuditStamp::now(),
        );
        assert_eq!(claims[0].claim_end_date, None);
        assert_eq!(claims[0].total_outstanding, 0.0);
    }
}
