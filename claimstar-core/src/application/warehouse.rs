// claimstar-core/src/application/warehouse.rs

//! The in-memory working set of one run: raw inputs plus every collection
//! built so far. Each slot is filled by exactly one build step.

use chrono::NaiveDate;

use crate::domain::audit::{AuditStamp, GoldRow, SilverRow};
use crate::domain::error::DomainError;
use crate::domain::gold::{
    DateRange, DimDate, DimEncounterType, DimPatient, DimPayer, DimProcedure, DimProvider,
    FactClaim, FactClaimTransaction, FactEncounter,
};
use crate::domain::raw::RawCollections;
use crate::domain::silver::{ClaimTransaction, Claim, Encounter, Patient, Payer, Provider};

/// Run-wide parameters shared by every step.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext {
    /// Reference date for ages.
    pub as_of: NaiveDate,
    /// Calendar used when no fact carries a date.
    pub fallback_range: DateRange,
    /// One audit instant for every row of the run.
    pub stamp: AuditStamp,
}

impl BuildContext {
    pub fn new(as_of: NaiveDate, fallback_range: DateRange) -> Self {
        Self {
            as_of,
            fallback_range,
            stamp: AuditStamp::now(),
        }
    }
}

pub struct Warehouse {
    pub context: BuildContext,
    pub raw: RawCollections,

    pub silver_patients: Option<Vec<SilverRow<Patient>>>,
    pub silver_payers: Option<Vec<SilverRow<Payer>>>,
    pub silver_providers: Option<Vec<SilverRow<Provider>>>,
    pub silver_claims: Option<Vec<SilverRow<Claim>>>,
    pub silver_claim_transactions: Option<Vec<SilverRow<ClaimTransaction>>>,
    pub silver_encounters: Option<Vec<SilverRow<Encounter>>>,

    pub dim_date: Option<Vec<GoldRow<DimDate>>>,
    pub dim_patient: Option<Vec<GoldRow<DimPatient>>>,
    pub dim_provider: Option<Vec<GoldRow<DimProvider>>>,
    pub dim_payer: Option<Vec<GoldRow<DimPayer>>>,
    pub dim_procedure: Option<Vec<GoldRow<DimProcedure>>>,
    pub dim_encounter_type: Option<Vec<GoldRow<DimEncounterType>>>,

    pub fact_claims: Option<Vec<GoldRow<FactClaim>>>,
    pub fact_encounters: Option<Vec<GoldRow<FactEncounter>>>,
    pub fact_claim_transactions: Option<Vec<GoldRow<FactClaimTransaction>>>,
}

impl Warehouse {
    pub fn new(raw: RawCollections, context: BuildContext) -> Self {
        Self {
            context,
            raw,
            silver_patients: None,
            silver_payers: None,
            silver_providers: None,
            silver_claims: None,
            silver_claim_transactions: None,
            silver_encounters: None,
            dim_date: None,
            dim_patient: None,
            dim_provider: None,
            dim_payer: None,
            dim_procedure: None,
            dim_encounter_type: None,
            fact_claims: None,
            fact_encounters: None,
            fact_claim_transactions: None,
        }
    }
}

/// Borrow a collection an earlier step must have produced.
pub fn need<'a, T>(slot: &'a Option<T>, step: &str, input: &str) -> Result<&'a T, DomainError> {
    slot.as_ref().ok_or_else(|| DomainError::MissingInput {
        step: step.to_string(),
        input: input.to_string(),
    })
}
