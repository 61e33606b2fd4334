// claimstar-core/src/domain/gold/mod.rs

//! The star schema: dimensions with unknown members, and facts keyed
//! exclusively by dimension surrogate keys.

pub mod calendar;
pub mod dimensions;
pub mod facts;

pub use calendar::{DateRange, DimDate, UNKNOWN_DATE_KEY, create_dim_date, date_key};
pub use dimensions::{
    DimEncounterType, DimPatient, DimPayer, DimProcedure, DimProvider, build_dim_encounter_type,
    build_dim_patient, build_dim_payer, build_dim_procedure, build_dim_provider,
};
pub use facts::{
    FactClaim, FactClaimTransaction, FactEncounter, build_fact_claim_transactions,
    build_fact_claims, build_fact_encounters,
};
