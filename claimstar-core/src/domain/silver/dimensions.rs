// claimstar-core/src/domain/silver/dimensions.rs

//! Conformed dimension-like entities: patients, payers, providers.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::audit::{AuditStamp, SilverRow, add_audit_columns};
use crate::domain::keys::{KeyRegistry, UNKNOWN_NATURAL_KEY};
use crate::domain::raw::{RawClaim, RawEncounter, RawPatient, RawPayer};
use crate::domain::silver::coerce::{
    calculate_age, clean_text, derive_age_group, parse_date, title_case,
};
use crate::domain::table::{Column, ColumnType, Record, Value};

pub const UNKNOWN_PATIENT_NAME: &str = "Unknown Patient";
pub const UNKNOWN_PAYER_NAME: &str = "Unknown Payer";

#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub patient_sk: i64,
    pub patient_id: String,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i64>,
    pub age_group: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payer {
    pub payer_sk: i64,
    pub payer_id: String,
    pub payer_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Provider {
    pub provider_sk: i64,
    pub provider_id: String,
    pub provider_name: String,
}

/// Registers `raw` and reports whether it is a new member.
/// Blank, reserved and repeated ids are counted and rejected.
#[derive(Default)]
struct Dedup {
    registry: KeyRegistry,
    blank: usize,
    repeated: usize,
}

impl Dedup {
    fn new() -> Self {
        Self {
            registry: KeyRegistry::with_reserved(UNKNOWN_NATURAL_KEY),
            ..Self::default()
        }
    }

    fn admit(&mut self, raw: Option<&str>) -> Option<(i64, String)> {
        let before = self.registry.len();
        match self.registry.register(raw) {
            None => {
                self.blank += 1;
                None
            }
            Some(_) if self.registry.len() == before => {
                self.repeated += 1;
                None
            }
            Some(sk) => raw.map(|r| (sk, r.trim().to_string())),
        }
    }

    fn report(&self, entity: &str, kept: usize) {
        if self.blank > 0 {
            warn!(entity, dropped = self.blank, "Rows without a usable natural key dropped");
        }
        if self.repeated > 0 {
            warn!(entity, dropped = self.repeated, "Duplicate natural keys dropped (first seen kept)");
        }
        debug!(entity, rows = kept, "Conformed");
    }
}

pub fn transform_patients(
    raw: &[RawPatient],
    as_of: NaiveDate,
    stamp: AuditStamp,
) -> Vec<SilverRow<Patient>> {
    let mut dedup = Dedup::new();
    let mut patients = Vec::with_capacity(raw.len());

    for row in raw {
        let Some((patient_sk, patient_id)) = dedup.admit(row.patient_id.as_deref()) else {
            continue;
        };
        let first = clean_text(row.first_name.as_deref()).map(|s| title_case(&s));
        let last = clean_text(row.last_name.as_deref()).map(|s| title_case(&s));
        let full_name = [first, last]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let full_name = if full_name.is_empty() {
            UNKNOWN_PATIENT_NAME.to_string()
        } else {
            full_name
        };
        let date_of_birth = parse_date(row.date_of_birth.as_deref());
        let age = calculate_age(date_of_birth, as_of);

        patients.push(Patient {
            patient_sk,
            patient_id,
            full_name,
            date_of_birth,
            age,
            age_group: derive_age_group(age).to_string(),
        });
    }

    dedup.report("patients", patients.len());
    add_audit_columns(patients, stamp)
}

pub fn transform_payers(raw: &[RawPayer], stamp: AuditStamp) -> Vec<SilverRow<Payer>> {
    let mut dedup = Dedup::new();
    let mut payers = Vec::with_capacity(raw.len());

    for row in raw {
        let Some((payer_sk, payer_id)) = dedup.admit(row.payer_id.as_deref()) else {
            continue;
        };
        let payer_name = clean_text(row.payer_name.as_deref())
            .map(|s| title_case(&s))
            .unwrap_or_else(|| UNKNOWN_PAYER_NAME.to_string());
        payers.push(Payer {
            payer_sk,
            payer_id,
            payer_name,
        });
    }

    dedup.report("payers", payers.len());
    add_audit_columns(payers, stamp)
}

/// Providers have no source of their own: they are the distinct provider ids
/// referenced by claims, then by encounters.
pub fn transform_providers(
    claims: &[RawClaim],
    encounters: &[RawEncounter],
    stamp: AuditStamp,
) -> Vec<SilverRow<Provider>> {
    let mut registry = KeyRegistry::with_reserved(UNKNOWN_NATURAL_KEY);
    let ids = claims
        .iter()
        .map(|c| c.provider_id.as_deref())
        .chain(encounters.iter().map(|e| e.provider_id.as_deref()));
    for id in ids {
        registry.register(id);
    }

    let providers: Vec<Provider> = registry
        .iter()
        .map(|(id, sk)| Provider {
            provider_sk: sk,
            provider_id: id.to_string(),
            provider_name: format!("Provider {}", id),
        })
        .collect();

    debug!(entity = "providers", rows = providers.len(), "Conformed");
    add_audit_columns(providers, stamp)
}

impl Record for Patient {
    fn columns() -> Vec<Column> {
        vec![
            Column::required("patient_sk", ColumnType::BigInt),
            Column::required("patient_id", ColumnType::Varchar(50)),
            Column::nullable("full_name", ColumnType::Varchar(255)),
            Column::nullable("date_of_birth", ColumnType::Date),
            Column::nullable("age", ColumnType::SmallInt),
            Column::nullable("age_group", ColumnType::Varchar(20)),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.patient_sk.into(),
            (&self.patient_id).into(),
            (&self.full_name).into(),
            self.date_of_birth.into(),
            self.age.into(),
            (&self.age_group).into(),
        ]
    }
}

impl Record for Payer {
    fn columns() -> Vec<Column> {
        vec![
            Column::required("payer_sk", ColumnType::BigInt),
            Column::required("payer_id", ColumnType::Varchar(50)),
            Column::nullable("payer_name", ColumnType::Varchar(255)),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.payer_sk.into(),
            (&self.payer_id).into(),
            (&self.payer_name).into(),
        ]
    }
}

impl Record for Provider {
    fn columns() -> Vec<Column> {
        vec![
            Column::required("provider_sk", ColumnType::BigInt),
            Column::required("provider_id", ColumnType::Varchar(50)),
            Column::nullable("provider_name", ColumnType::Varchar(255)),
        ]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.provider_sk.into(),
            (&self.provider_id).into(),
            (&self.provider_name).into(),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()
    }

    fn patient(id: &str, first: &str, last: &str, dob: &str) -> RawPatient {
        RawPatient {
            patient_id: Some(id.to_string()),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            date_of_birth: Some(dob.to_string()),
        }
    }

    #[test]
    fn test_patients_are_cleaned_and_keyed() {
        let raw = vec![
            patient("P1", "  aNNa ", "SMITH", "2000-03-01"),
            patient("P2", "", "", "not-a-date"),
            patient("P3", "bob", "", "1940-01-01"),
        ];
        let rows = transform_patients(&raw, as_of(), AuditStamp::now());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].patient_sk, 1);
        assert_eq!(rows[0].full_name, "Anna Smith");
        assert_eq!(rows[0].age, Some(23));
        assert_eq!(rows[0].age_group, "18-25");

        assert_eq!(rows[1].full_name, "Unknown Patient");
        assert_eq!(rows[1].date_of_birth, None);
        assert_eq!(rows[1].age_group, "Unknown");

        assert_eq!(rows[2].full_name, "Bob");
        assert_eq!(rows[2].age_group, "75+");
    }

    #[test]
    fn test_patient_keys_stay_dense_over_bad_rows() {
        let raw = vec![
            patient("P1", "a", "b", ""),
            RawPatient::default(),
            patient("P1", "dup", "row", ""),
            patient(" ", "blank", "id", ""),
            patient("P2", "c", "d", ""),
        ];
        let rows = transform_patients(&raw, as_of(), AuditStamp::now());
        let keys: Vec<(i64, &str)> = rows
            .iter()
            .map(|r| (r.patient_sk, r.patient_id.as_str()))
            .collect();
        assert_eq!(keys, vec![(1, "P1"), (2, "P2")]);
        assert_eq!(rows[0].full_name, "A B", "first occurrence wins");
    }

    #[test]
    fn test_payer_name_default() {
        let raw = vec![
            RawPayer {
                payer_id: Some("PAY1".into()),
                payer_name: Some("blue shield".into()),
            },
            RawPayer {
                payer_id: Some("PAY2".into()),
                payer_name: None,
            },
        ];
        let rows = transform_payers(&raw, AuditStamp::now());
        assert_eq!(rows[0].payer_name, "Blue Shield");
        assert_eq!(rows[1].payer_name, "Unknown Payer");
    }

    #[test]
    fn test_providers_come_from_claims_then_encounters() {
        let claims = vec![
            RawClaim {
                provider_id: Some("PR2".into()),
                ..RawClaim::default()
            },
            RawClaim::default(),
        ];
        let encounters = vec![
            RawEncounter {
                provider_id: Some("PR1".into()),
                ..RawEncounter::default()
            },
            RawEncounter {
                provider_id: Some("PR2".into()),
                ..RawEncounter::default()
            },
        ];
        let rows = transform_providers(&claims, &encounters, AuditStamp::now());
        let ids: Vec<(i64, &str, &str)> = rows
            .iter()
            .map(|r| (r.provider_sk, r.provider_id.as_str(), r.provider_name.as_str()))
            .collect();
        assert_eq!(
            ids,
            vec![(1, "PR2", "Provider PR2"), (2, "PR1", "Provider PR1")]
        );
    }
}
