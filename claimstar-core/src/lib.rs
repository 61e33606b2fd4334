// claimstar-core/src/lib.rs

#![allow(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports: the destination store contract.
pub mod ports;

// 2. Domain: keys, calendar, conformance, star-schema builders, build graph.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure: DuckDB, YAML config, CSV ingestion.
pub mod infrastructure;

// 4. Application: warehouse working set, build registry, orchestration.
pub mod application;

pub mod error;

pub use error::ClaimstarError;
