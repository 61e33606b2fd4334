// claimstar-core/src/application/fixtures.rs

//! A small raw data set exercising the conformance edge cases.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;

use crate::application::warehouse::BuildContext;
use crate::domain::gold::DateRange;
use crate::domain::raw::{
    RawClaim, RawClaimTransaction, RawCollections, RawEncounter, RawPatient, RawPayer,
};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn s(v: &str) -> Option<String> {
    Some(v.to_string())
}

pub fn context() -> BuildContext {
    BuildContext::new(d(2024, 2, 28), DateRange::default_until(d(2024, 2, 28)))
}

pub fn raw() -> RawCollections {
    RawCollections {
        patients: vec![
            RawPatient {
                patient_id: s("P1"),
                first_name: s("ana"),
                last_name: s("lima"),
                date_of_birth: s("2000-03-01"),
            },
            RawPatient {
                patient_id: s("P2"),
                first_name: s("BO"),
                last_name: s("chen"),
                date_of_birth: None,
            },
        ],
        payers: vec![RawPayer {
            payer_id: s("PAY1"),
            payer_name: s("acme health"),
        }],
        claims: vec![RawClaim {
            claim_id: s("C1"),
            patient_id: s("P1"),
            provider_id: s("PR1"),
            claim_start_date: s("2024-06-10"),
            claim_end_date: s("2024-06-01"),
            outstanding_primary: s("10.50"),
            outstanding_secondary: s("abc"),
            outstanding_patient: None,
        }],
        claim_transactions: vec![
            RawClaimTransaction {
                transaction_id: s("T1"),
                claim_id: s("C1"),
                patient_id: s("P404"),
                provider_id: s("PR1"),
                transaction_date: s("2024-06-11"),
                transaction_amount: s("12.5"),
                procedure_code: s("99213"),
            },
            RawClaimTransaction {
                transaction_id: s("T2"),
                claim_id: s("C1"),
                patient_id: s("P1"),
                provider_id: s("PR1"),
                transaction_date: s("2024-06-12"),
                transaction_amount: s("3"),
                procedure_code: None,
            },
        ],
        encounters: vec![RawEncounter {
            encounter_id: s("E1"),
            patient_id: s("P1"),
            provider_id: s("PR2"),
            payer_id: s("PAY1"),
            encounter_date: s("2024-05-10"),
            discharge_date: s("2024-05-08"),
            encounter_type: s("inpatient"),
            total_claim_cost: s("250"),
            payer_coverage: s("200.75"),
        }],
    }
}
