// claimstar-core/src/domain/raw.rs

//! Raw (Bronze) rows exactly as extracted: every field optional text.

use serde::Deserialize;

use crate::domain::table::{Column, ColumnType, Record, Value};

/// A raw collection's identity and the columns its source must provide.
pub trait RawRecord {
    /// Key used in configuration (`sources.<collection>`).
    const COLLECTION: &'static str;
    const BRONZE_TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn fields(&self) -> Vec<&Option<String>>;
}

fn text_columns(names: &'static [&'static str]) -> Vec<Column> {
    names
        .iter()
        .map(|n| Column::nullable(*n, ColumnType::Varchar(255)))
        .collect()
}

macro_rules! raw_record {
    (
        $(#[$meta:meta])*
        $name:ident, $collection:literal, $table:literal { $($field:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
        pub struct $name {
            $(pub $field: Option<String>,)+
        }

        impl RawRecord for $name {
            const COLLECTION: &'static str = $collection;
            const BRONZE_TABLE: &'static str = $table;
            const COLUMNS: &'static [&'static str] = &[$(stringify!($field)),+];

            fn fields(&self) -> Vec<&Option<String>> {
                vec![$(&self.$field),+]
            }
        }

        impl Record for $name {
            fn columns() -> Vec<Column> {
                text_columns(<Self as RawRecord>::COLUMNS)
            }

            fn values(&self) -> Vec<Value> {
                self.fields().into_iter().map(|f| Value::from(f.clone())).collect()
            }
        }
    };
}

raw_record!(
    RawPatient, "patients", "bronze_patients" {
        patient_id, first_name, last_name, date_of_birth
    }
);

raw_record!(
    RawPayer, "payers", "bronze_payers" {
        payer_id, payer_name
    }
);

raw_record!(
    RawClaim, "claims", "bronze_claims" {
        claim_id, patient_id, provider_id, claim_start_date, claim_end_date,
        outstanding_primary, outstanding_secondary, outstanding_patient
    }
);

raw_record!(
    RawClaimTransaction, "claim_transactions", "bronze_claims_transactions" {
        transaction_id, claim_id, patient_id, provider_id, transaction_date,
        transaction_amount, procedure_code
    }
);

raw_record!(
    /// Encounters carry the payer reference; claims do not.
    RawEncounter, "encounters", "bronze_encounters" {
        encounter_id, patient_id, provider_id, payer_id, encounter_date,
        discharge_date, encounter_type, total_claim_cost, payer_coverage
    }
);

/// The five named raw inputs of one run.
#[derive(Debug, Clone, Default)]
pub struct RawCollections {
    pub patients: Vec<RawPatient>,
    pub payers: Vec<RawPayer>,
    pub claims: Vec<RawClaim>,
    pub claim_transactions: Vec<RawClaimTransaction>,
    pub encounters: Vec<RawEncounter>,
}
