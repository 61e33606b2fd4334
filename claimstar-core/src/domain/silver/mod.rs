// claimstar-core/src/domain/silver/mod.rs

//! Conformed (Silver) entities: cleaned, validated, key-annotated raw rows.

pub mod coerce;
pub mod dimensions;
pub mod facts;

use std::collections::HashMap;

use crate::domain::keys::natural_key;

pub use dimensions::{
    Patient, Payer, Provider, transform_patients, transform_payers, transform_providers,
};
pub use facts::{
    Claim, ClaimTransaction, Encounter, transform_claim_transactions, transform_claims,
    transform_encounters,
};

/// Natural key -> surrogate key of an already conformed entity.
/// Misses stay `None`; the sentinel is a Gold concern.
#[derive(Debug, Clone, Default)]
pub struct NaturalKeyIndex {
    keys: HashMap<String, i64>,
}

impl NaturalKeyIndex {
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        Self {
            keys: pairs
                .into_iter()
                .map(|(k, sk)| (k.to_string(), sk))
                .collect(),
        }
    }

    pub fn lookup(&self, raw: Option<&str>) -> Option<i64> {
        natural_key(raw).and_then(|k| self.keys.get(&k).copied())
    }
}
