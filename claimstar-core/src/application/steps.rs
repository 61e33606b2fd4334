// claimstar-core/src/application/steps.rs

//! The ordered build registry: one typed step per output table.
//!
//! Each step names its prerequisites, fills exactly one slot of the
//! [`Warehouse`] and hands back the table to persist. The orchestrator walks
//! the registry through the graph solver, never by position.

use serde::{Deserialize, Serialize};

use crate::application::warehouse::{Warehouse, need};
use crate::domain::audit::{Audited, GoldRow, SilverRow};
use crate::domain::dimension::{Dimension, DimensionIndex};
use crate::domain::error::DomainError;
use crate::domain::gold::{
    self, DateRange, DimDate, DimEncounterType, DimPatient, DimPayer, DimProcedure, DimProvider,
    FactClaim, FactClaimTransaction, FactEncounter,
};
use crate::domain::graph::PlanNode;
use crate::domain::keys::UNKNOWN_NATURAL_KEY;
use crate::domain::raw::{
    RawClaim, RawClaimTransaction, RawEncounter, RawPatient, RawPayer, RawRecord,
};
use crate::domain::silver::{
    self, Claim, ClaimTransaction, Encounter, NaturalKeyIndex, Patient, Payer, Provider,
};
use crate::domain::table::{Column, Record, Table, quote_ident};

pub const SILVER_DIM_PATIENT: &str = "silver_dim_patient";
pub const SILVER_DIM_PAYER: &str = "silver_dim_payer";
pub const SILVER_DIM_PROVIDER: &str = "silver_dim_provider";
pub const SILVER_FACT_CLAIM: &str = "silver_fact_claim";
pub const SILVER_FACT_CLAIM_TRANSACTION: &str = "silver_fact_claim_transaction";
pub const SILVER_FACT_ENCOUNTER: &str = "silver_fact_encounter";

pub const GOLD_DIM_DATE: &str = "gold_dim_date";
pub const GOLD_DIM_PATIENT: &str = "gold_dim_patient";
pub const GOLD_DIM_PROVIDER: &str = "gold_dim_provider";
pub const GOLD_DIM_PAYER: &str = "gold_dim_payer";
pub const GOLD_DIM_PROCEDURE: &str = "gold_dim_procedure";
pub const GOLD_DIM_ENCOUNTER_TYPE: &str = "gold_dim_encounter_type";
pub const GOLD_FACT_CLAIMS: &str = "gold_fact_claims";
pub const GOLD_FACT_ENCOUNTERS: &str = "gold_fact_encounters";
pub const GOLD_FACT_CLAIM_TRANSACTIONS: &str = "gold_fact_claim_transactions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Bronze,
    Silver,
    Gold,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Bronze => write!(f, "bronze"),
            Stage::Silver => write!(f, "silver"),
            Stage::Gold => write!(f, "gold"),
        }
    }
}

/// A post-replace assertion, evaluated by the store. Each check's query
/// returns the number of offending rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityCheck {
    /// No surrogate key appears twice.
    UniqueKey(&'static str),
    /// Exactly one row carries key -1, and it is the only row carrying the
    /// sentinel natural key.
    UnknownMember {
        key: &'static str,
        natural_key: &'static str,
        sentinel: &'static str,
    },
    /// Every value of `column` exists as `key` in `dimension`.
    References {
        column: &'static str,
        dimension: &'static str,
        key: &'static str,
    },
}

impl IntegrityCheck {
    pub fn name(&self) -> String {
        match self {
            IntegrityCheck::UniqueKey(key) => format!("unique_key({})", key),
            IntegrityCheck::UnknownMember { key, .. } => format!("unknown_member({})", key),
            IntegrityCheck::References {
                column, dimension, ..
            } => format!("references({} -> {})", column, dimension),
        }
    }

    pub fn violations_sql(&self, table: &str) -> String {
        let table = quote_ident(table);
        match self {
            IntegrityCheck::UniqueKey(key) => {
                let key = quote_ident(key);
                format!(
                    "SELECT COUNT(*) FROM (SELECT {key} FROM {table} GROUP BY {key} HAVING COUNT(*) > 1)"
                )
            }
            IntegrityCheck::UnknownMember {
                key,
                natural_key,
                sentinel,
            } => format!(
                "SELECT ABS(COUNT(*) FILTER (WHERE {key} = -1) - 1) + COUNT(*) FILTER (WHERE ({key} = -1) <> ({nk} = '{sentinel}')) FROM {table}",
                key = quote_ident(key),
                nk = quote_ident(natural_key),
                sentinel = sentinel.replace('\'', "''"),
            ),
            IntegrityCheck::References {
                column,
                dimension,
                key,
            } => format!(
                "SELECT COUNT(*) FROM {table} AS f LEFT JOIN {dim} AS d ON f.{column} = d.{key} WHERE d.{key} IS NULL",
                dim = quote_ident(dimension),
                column = quote_ident(column),
                key = quote_ident(key),
            ),
        }
    }
}

pub type BuildFn = fn(&mut Warehouse) -> Result<Table, DomainError>;
pub type SchemaFn = fn() -> Vec<Column>;

pub struct BuildStep {
    pub name: &'static str,
    pub stage: Stage,
    pub dependencies: &'static [&'static str],
    pub build: BuildFn,
    pub output_schema: SchemaFn,
    pub checks: &'static [IntegrityCheck],
}

impl PlanNode for BuildStep {
    fn name(&self) -> &str {
        self.name
    }

    fn dependencies(&self) -> &[&str] {
        self.dependencies
    }
}

impl std::fmt::Debug for BuildStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildStep")
            .field("name", &self.name)
            .field("stage", &self.stage)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

fn step<R: Record>(
    name: &'static str,
    stage: Stage,
    dependencies: &'static [&'static str],
    build: BuildFn,
    checks: &'static [IntegrityCheck],
) -> BuildStep {
    BuildStep {
        name,
        stage,
        dependencies,
        build,
        output_schema: R::columns,
        checks,
    }
}

/// Every table of the warehouse in declaration order: Bronze, then Silver,
/// then Gold dimensions, then Gold facts.
pub fn registry() -> Vec<BuildStep> {
    vec![
        // --- BRONZE ---
        step::<RawPatient>(RawPatient::BRONZE_TABLE, Stage::Bronze, &[], bronze_patients, &[]),
        step::<RawPayer>(RawPayer::BRONZE_TABLE, Stage::Bronze, &[], bronze_payers, &[]),
        step::<RawClaim>(RawClaim::BRONZE_TABLE, Stage::Bronze, &[], bronze_claims, &[]),
        step::<RawClaimTransaction>(
            RawClaimTransaction::BRONZE_TABLE,
            Stage::Bronze,
            &[],
            bronze_claim_transactions,
            &[],
        ),
        step::<RawEncounter>(RawEncounter::BRONZE_TABLE, Stage::Bronze, &[], bronze_encounters, &[]),
        // --- SILVER ---
        step::<SilverRow<Patient>>(
            SILVER_DIM_PATIENT,
            Stage::Silver,
            &[RawPatient::BRONZE_TABLE],
            silver_patients,
            &[IntegrityCheck::UniqueKey("patient_sk")],
        ),
        step::<SilverRow<Payer>>(
            SILVER_DIM_PAYER,
            Stage::Silver,
            &[RawPayer::BRONZE_TABLE],
            silver_payers,
            &[IntegrityCheck::UniqueKey("payer_sk")],
        ),
        step::<SilverRow<Provider>>(
            SILVER_DIM_PROVIDER,
            Stage::Silver,
            &[RawClaim::BRONZE_TABLE, RawEncounter::BRONZE_TABLE],
            silver_providers,
            &[IntegrityCheck::UniqueKey("provider_sk")],
        ),
        step::<SilverRow<Claim>>(
            SILVER_FACT_CLAIM,
            Stage::Silver,
            &[RawClaim::BRONZE_TABLE, SILVER_DIM_PATIENT, SILVER_DIM_PROVIDER],
            silver_claims,
            &[],
        ),
        step::<SilverRow<ClaimTransaction>>(
            SILVER_FACT_CLAIM_TRANSACTION,
            Stage::Silver,
            &[
                RawClaimTransaction::BRONZE_TABLE,
                SILVER_DIM_PATIENT,
                SILVER_DIM_PROVIDER,
            ],
            silver_claim_transactions,
            &[],
        ),
        step::<SilverRow<Encounter>>(
            SILVER_FACT_ENCOUNTER,
            Stage::Silver,
            &[
                RawEncounter::BRONZE_TABLE,
                SILVER_DIM_PATIENT,
                SILVER_DIM_PROVIDER,
                SILVER_DIM_PAYER,
            ],
            silver_encounters,
            &[],
        ),
        // --- GOLD DIMENSIONS ---
        step::<GoldRow<DimDate>>(
            GOLD_DIM_DATE,
            Stage::Gold,
            &[
                SILVER_FACT_CLAIM,
                SILVER_FACT_CLAIM_TRANSACTION,
                SILVER_FACT_ENCOUNTER,
            ],
            gold_dim_date,
            &[
                IntegrityCheck::UniqueKey("date_sk"),
                IntegrityCheck::UnknownMember {
                    key: "date_sk",
                    natural_key: "date_key",
                    sentinel: gold::UNKNOWN_DATE_KEY,
                },
            ],
        ),
        step::<GoldRow<DimPatient>>(
            GOLD_DIM_PATIENT,
            Stage::Gold,
            &[SILVER_DIM_PATIENT],
            gold_dim_patient,
            &[
                IntegrityCheck::UniqueKey("patient_sk"),
                IntegrityCheck::UnknownMember {
                    key: "patient_sk",
                    natural_key: "patient_natural_key",
                    sentinel: UNKNOWN_NATURAL_KEY,
                },
            ],
        ),
        step::<GoldRow<DimProvider>>(
            GOLD_DIM_PROVIDER,
            Stage::Gold,
            &[SILVER_DIM_PROVIDER],
            gold_dim_provider,
            &[
                IntegrityCheck::UniqueKey("provider_sk"),
                IntegrityCheck::UnknownMember {
                    key: "provider_sk",
                    natural_key: "provider_natural_key",
                    sentinel: UNKNOWN_NATURAL_KEY,
                },
            ],
        ),
        step::<GoldRow<DimPayer>>(
            GOLD_DIM_PAYER,
            Stage::Gold,
            &[SILVER_DIM_PAYER],
            gold_dim_payer,
            &[
                IntegrityCheck::UniqueKey("payer_sk"),
                IntegrityCheck::UnknownMember {
                    key: "payer_sk",
                    natural_key: "payer_natural_key",
                    sentinel: UNKNOWN_NATURAL_KEY,
                },
            ],
        ),
        step::<GoldRow<DimProcedure>>(
            GOLD_DIM_PROCEDURE,
            Stage::Gold,
            &[SILVER_FACT_CLAIM_TRANSACTION],
            gold_dim_procedure,
            &[
                IntegrityCheck::UniqueKey("procedure_sk"),
                IntegrityCheck::UnknownMember {
                    key: "procedure_sk",
                    natural_key: "procedure_code",
                    sentinel: UNKNOWN_NATURAL_KEY,
                },
            ],
        ),
        step::<GoldRow<DimEncounterType>>(
            GOLD_DIM_ENCOUNTER_TYPE,
            Stage::Gold,
            &[SILVER_FACT_ENCOUNTER],
            gold_dim_encounter_type,
            &[
                IntegrityCheck::UniqueKey("encounter_type_sk"),
                IntegrityCheck::UnknownMember {
                    key: "encounter_type_sk",
                    natural_key: "encounter_type",
                    sentinel: UNKNOWN_NATURAL_KEY,
                },
            ],
        ),
        // --- GOLD FACTS ---
        step::<GoldRow<FactClaim>>(
            GOLD_FACT_CLAIMS,
            Stage::Gold,
            &[
                SILVER_FACT_CLAIM,
                GOLD_DIM_DATE,
                GOLD_DIM_PATIENT,
                GOLD_DIM_PROVIDER,
            ],
            gold_fact_claims,
            &[
                IntegrityCheck::References {
                    column: "patient_sk",
                    dimension: GOLD_DIM_PATIENT,
                    key: "patient_sk",
                },
                IntegrityCheck::References {
                    column: "provider_sk",
                    dimension: GOLD_DIM_PROVIDER,
                    key: "provider_sk",
                },
                IntegrityCheck::References {
                    column: "claim_start_date_sk",
                    dimension: GOLD_DIM_DATE,
                    key: "date_sk",
                },
                IntegrityCheck::References {
                    column: "claim_end_date_sk",
                    dimension: GOLD_DIM_DATE,
                    key: "date_sk",
                },
            ],
        ),
        step::<GoldRow<FactEncounter>>(
            GOLD_FACT_ENCOUNTERS,
            Stage::Gold,
            &[
                SILVER_FACT_ENCOUNTER,
                GOLD_DIM_DATE,
                GOLD_DIM_PATIENT,
                GOLD_DIM_PROVIDER,
                GOLD_DIM_PAYER,
                GOLD_DIM_ENCOUNTER_TYPE,
            ],
            gold_fact_encounters,
            &[
                IntegrityCheck::References {
                    column: "patient_sk",
                    dimension: GOLD_DIM_PATIENT,
                    key: "patient_sk",
                },
                IntegrityCheck::References {
                    column: "provider_sk",
                    dimension: GOLD_DIM_PROVIDER,
                    key: "provider_sk",
                },
                IntegrityCheck::References {
                    column: "payer_sk",
                    dimension: GOLD_DIM_PAYER,
                    key: "payer_sk",
                },
                IntegrityCheck::References {
                    column: "encounter_type_sk",
                    dimension: GOLD_DIM_ENCOUNTER_TYPE,
                    key: "encounter_type_sk",
                },
                IntegrityCheck::References {
                    column: "encounter_date_sk",
                    dimension: GOLD_DIM_DATE,
                    key: "date_sk",
                },
                IntegrityCheck::References {
                    column: "discharge_date_sk",
                    dimension: GOLD_DIM_DATE,
                    key: "date_sk",
                },
            ],
        ),
        step::<GoldRow<FactClaimTransaction>>(
            GOLD_FACT_CLAIM_TRANSACTIONS,
            Stage::Gold,
            &[
                SILVER_FACT_CLAIM_TRANSACTION,
                GOLD_DIM_DATE,
                GOLD_DIM_PATIENT,
                GOLD_DIM_PROVIDER,
                GOLD_DIM_PROCEDURE,
            ],
            gold_fact_claim_transactions,
            &[
                IntegrityCheck::References {
                    column: "patient_sk",
                    dimension: GOLD_DIM_PATIENT,
                    key: "patient_sk",
                },
                IntegrityCheck::References {
                    column: "provider_sk",
                    dimension: GOLD_DIM_PROVIDER,
                    key: "provider_sk",
                },
                IntegrityCheck::References {
                    column: "transaction_date_sk",
                    dimension: GOLD_DIM_DATE,
                    key: "date_sk",
                },
                IntegrityCheck::References {
                    column: "procedure_sk",
                    dimension: GOLD_DIM_PROCEDURE,
                    key: "procedure_sk",
                },
            ],
        ),
    ]
}

// --- BRONZE ---

fn bronze_patients(wh: &mut Warehouse) -> Result<Table, DomainError> {
    Ok(Table::from_records(RawPatient::BRONZE_TABLE, &wh.raw.patients))
}

fn bronze_payers(wh: &mut Warehouse) -> Result<Table, DomainError> {
    Ok(Table::from_records(RawPayer::BRONZE_TABLE, &wh.raw.payers))
}

fn bronze_claims(wh: &mut Warehouse) -> Result<Table, DomainError> {
    Ok(Table::from_records(RawClaim::BRONZE_TABLE, &wh.raw.claims))
}

fn bronze_claim_transactions(wh: &mut Warehouse) -> Result<Table, DomainError> {
    Ok(Table::from_records(
        RawClaimTransaction::BRONZE_TABLE,
        &wh.raw.claim_transactions,
    ))
}

fn bronze_encounters(wh: &mut Warehouse) -> Result<Table, DomainError> {
    Ok(Table::from_records(RawEncounter::BRONZE_TABLE, &wh.raw.encounters))
}

// --- SILVER ---

fn patient_index(rows: &[SilverRow<Patient>]) -> NaturalKeyIndex {
    NaturalKeyIndex::new(rows.iter().map(|r| (r.patient_id.as_str(), r.patient_sk)))
}

fn provider_index(rows: &[SilverRow<Provider>]) -> NaturalKeyIndex {
    NaturalKeyIndex::new(rows.iter().map(|r| (r.provider_id.as_str(), r.provider_sk)))
}

fn payer_index(rows: &[SilverRow<Payer>]) -> NaturalKeyIndex {
    NaturalKeyIndex::new(rows.iter().map(|r| (r.payer_id.as_str(), r.payer_sk)))
}

fn silver_patients(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let rows = silver::transform_patients(&wh.raw.patients, wh.context.as_of, wh.context.stamp);
    let table = Table::from_records(SILVER_DIM_PATIENT, &rows);
    wh.silver_patients = Some(rows);
    Ok(table)
}

fn silver_payers(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let rows = silver::transform_payers(&wh.raw.payers, wh.context.stamp);
    let table = Table::from_records(SILVER_DIM_PAYER, &rows);
    wh.silver_payers = Some(rows);
    Ok(table)
}

fn silver_providers(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let rows = silver::transform_providers(&wh.raw.claims, &wh.raw.encounters, wh.context.stamp);
    let table = Table::from_records(SILVER_DIM_PROVIDER, &rows);
    wh.silver_providers = Some(rows);
    Ok(table)
}

fn silver_claims(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let step = SILVER_FACT_CLAIM;
    let patients = patient_index(need(&wh.silver_patients, step, SILVER_DIM_PATIENT)?);
    let providers = provider_index(need(&wh.silver_providers, step, SILVER_DIM_PROVIDER)?);
    let rows = silver::transform_claims(&wh.raw.claims, &patients, &providers, wh.context.stamp);
    let table = Table::from_records(step, &rows);
    wh.silver_claims = Some(rows);
    Ok(table)
}

fn silver_claim_transactions(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let step = SILVER_FACT_CLAIM_TRANSACTION;
    let patients = patient_index(need(&wh.silver_patients, step, SILVER_DIM_PATIENT)?);
    let providers = provider_index(need(&wh.silver_providers, step, SILVER_DIM_PROVIDER)?);
    let rows = silver::transform_claim_transactions(
        &wh.raw.claim_transactions,
        &patients,
        &providers,
        wh.context.stamp,
    );
    let table = Table::from_records(step, &rows);
    wh.silver_claim_transactions = Some(rows);
    Ok(table)
}

fn silver_encounters(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let step = SILVER_FACT_ENCOUNTER;
    let patients = patient_index(need(&wh.silver_patients, step, SILVER_DIM_PATIENT)?);
    let providers = provider_index(need(&wh.silver_providers, step, SILVER_DIM_PROVIDER)?);
    let payers = payer_index(need(&wh.silver_payers, step, SILVER_DIM_PAYER)?);
    let rows = silver::transform_encounters(
        &wh.raw.encounters,
        &patients,
        &providers,
        &payers,
        wh.context.stamp,
    );
    let table = Table::from_records(step, &rows);
    wh.silver_encounters = Some(rows);
    Ok(table)
}

// --- GOLD DIMENSIONS ---

/// Min/max over every fact date that survived conformance.
fn observed_fact_dates(wh: &Warehouse, step: &str) -> Result<Option<DateRange>, DomainError> {
    let claims = need(&wh.silver_claims, step, SILVER_FACT_CLAIM)?;
    let transactions = need(&wh.silver_claim_transactions, step, SILVER_FACT_CLAIM_TRANSACTION)?;
    let encounters = need(&wh.silver_encounters, step, SILVER_FACT_ENCOUNTER)?;

    let dates = claims
        .iter()
        .flat_map(|c| [c.claim_start_date, c.claim_end_date])
        .chain(transactions.iter().map(|t| t.transaction_date))
        .chain(
            encounters
                .iter()
                .flat_map(|e| [e.encounter_date, e.discharge_date]),
        )
        .flatten();
    Ok(DateRange::observed(dates))
}

fn gold_dim_date(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let range = match observed_fact_dates(wh, GOLD_DIM_DATE)? {
        Some(range) => range,
        None => {
            tracing::warn!("No fact dates observed, using the fallback calendar");
            wh.context.fallback_range
        }
    };
    tracing::debug!(start = %range.start(), end = %range.end(), "Calendar range");
    let rows = gold::create_dim_date(range, wh.context.stamp);
    let table = Table::from_records(GOLD_DIM_DATE, &rows);
    wh.dim_date = Some(rows);
    Ok(table)
}

fn gold_dim_patient(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let silver = need(&wh.silver_patients, GOLD_DIM_PATIENT, SILVER_DIM_PATIENT)?;
    let rows = gold::build_dim_patient(silver, wh.context.stamp);
    let table = Table::from_records(GOLD_DIM_PATIENT, &rows);
    wh.dim_patient = Some(rows);
    Ok(table)
}

fn gold_dim_provider(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let silver = need(&wh.silver_providers, GOLD_DIM_PROVIDER, SILVER_DIM_PROVIDER)?;
    let rows = gold::build_dim_provider(silver, wh.context.stamp);
    let table = Table::from_records(GOLD_DIM_PROVIDER, &rows);
    wh.dim_provider = Some(rows);
    Ok(table)
}

fn gold_dim_payer(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let silver = need(&wh.silver_payers, GOLD_DIM_PAYER, SILVER_DIM_PAYER)?;
    let rows = gold::build_dim_payer(silver, wh.context.stamp);
    let table = Table::from_records(GOLD_DIM_PAYER, &rows);
    wh.dim_payer = Some(rows);
    Ok(table)
}

fn gold_dim_procedure(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let silver = need(
        &wh.silver_claim_transactions,
        GOLD_DIM_PROCEDURE,
        SILVER_FACT_CLAIM_TRANSACTION,
    )?;
    let rows = gold::build_dim_procedure(silver, wh.context.stamp);
    let table = Table::from_records(GOLD_DIM_PROCEDURE, &rows);
    wh.dim_procedure = Some(rows);
    Ok(table)
}

fn gold_dim_encounter_type(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let silver = need(
        &wh.silver_encounters,
        GOLD_DIM_ENCOUNTER_TYPE,
        SILVER_FACT_ENCOUNTER,
    )?;
    let rows = gold::build_dim_encounter_type(silver, wh.context.stamp);
    let table = Table::from_records(GOLD_DIM_ENCOUNTER_TYPE, &rows);
    wh.dim_encounter_type = Some(rows);
    Ok(table)
}

// --- GOLD FACTS ---

fn index_of<D: Dimension, S>(
    slot: &Option<Vec<Audited<D, S>>>,
    step: &str,
    input: &str,
) -> Result<DimensionIndex, DomainError> {
    need(slot, step, input).map(|rows| DimensionIndex::from_rows(rows.as_slice()))
}

fn gold_fact_claims(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let step = GOLD_FACT_CLAIMS;
    let dates = index_of(&wh.dim_date, step, GOLD_DIM_DATE)?;
    let silver = need(&wh.silver_claims, step, SILVER_FACT_CLAIM)?;
    let rows = gold::build_fact_claims(silver, &dates, wh.context.stamp);
    let table = Table::from_records(step, &rows);
    wh.fact_claims = Some(rows);
    Ok(table)
}

fn gold_fact_encounters(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let step = GOLD_FACT_ENCOUNTERS;
    let dates = index_of(&wh.dim_date, step, GOLD_DIM_DATE)?;
    let types = index_of(&wh.dim_encounter_type, step, GOLD_DIM_ENCOUNTER_TYPE)?;
    let silver = need(&wh.silver_encounters, step, SILVER_FACT_ENCOUNTER)?;
    let rows = gold::build_fact_encounters(silver, &dates, &types, wh.context.stamp);
    let table = Table::from_records(step, &rows);
    wh.fact_encounters = Some(rows);
    Ok(table)
}

fn gold_fact_claim_transactions(wh: &mut Warehouse) -> Result<Table, DomainError> {
    let step = GOLD_FACT_CLAIM_TRANSACTIONS;
    let dates = index_of(&wh.dim_date, step, GOLD_DIM_DATE)?;
    let procedures = index_of(&wh.dim_procedure, step, GOLD_DIM_PROCEDURE)?;
    let silver = need(
        &wh.silver_claim_transactions,
        step,
        SILVER_FACT_CLAIM_TRANSACTION,
    )?;
    let rows = gold::build_fact_claim_transactions(silver, &dates, &procedures, wh.context.stamp);
    let table = Table::from_records(step, &rows);
    wh.fact_claim_transactions = Some(rows);
    Ok(table)
}
