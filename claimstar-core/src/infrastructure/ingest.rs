// claimstar-core/src/infrastructure/ingest.rs

//! Raw CSV sources -> typed raw collections.

use csv::{ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::raw::{RawCollections, RawRecord};
use crate::error::ClaimstarError;
use crate::infrastructure::config::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

fn csv_error(path: &Path, source: csv::Error) -> ClaimstarError {
    InfrastructureError::Csv {
        path: path.display().to_string(),
        source,
    }
    .into()
}

/// Reads one CSV into raw rows. Every column `R` declares must be present in
/// the header; extra columns are ignored. Values are kept verbatim.
pub fn read_raw_csv<R>(path: &Path) -> Result<Vec<R>, ClaimstarError>
where
    R: RawRecord + DeserializeOwned,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim())
        .collect();

    for column in R::COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(DomainError::MissingColumn {
                collection: R::COLLECTION.to_string(),
                column: column.to_string(),
            }
            .into());
        }
    }
    reader.set_headers(headers);

    let mut rows = Vec::new();
    for record in reader.deserialize::<R>() {
        rows.push(record.map_err(|e| csv_error(path, e))?);
    }
    Ok(rows)
}

/// Loads the collection configured for `R`. A missing optional source is an
/// empty collection; a missing or empty required one is fatal.
pub fn load_collection<R>(project_dir: &Path, config: &ProjectConfig) -> Result<Vec<R>, ClaimstarError>
where
    R: RawRecord + DeserializeOwned,
{
    let path = project_dir.join(config.source_path(R::COLLECTION));
    let required = config.is_required(R::COLLECTION);

    if !path.exists() {
        if required {
            return Err(InfrastructureError::ConfigError(format!(
                "Required source '{}' not found at {}",
                R::COLLECTION,
                path.display()
            ))
            .into());
        }
        warn!(collection = R::COLLECTION, path = %path.display(), "Optional source missing, using no rows");
        return Ok(Vec::new());
    }

    let rows: Vec<R> = read_raw_csv(&path)?;
    if rows.is_empty() && required {
        return Err(DomainError::EmptyInput(R::COLLECTION.to_string()).into());
    }
    info!(collection = R::COLLECTION, rows = rows.len(), "Raw source loaded");
    Ok(rows)
}

#[instrument(skip(config))]
pub fn load_raw_collections(
    project_dir: &Path,
    config: &ProjectConfig,
) -> Result<RawCollections, ClaimstarError> {
    Ok(RawCollections {
        patients: load_collection(project_dir, config)?,
        payers: load_collection(project_dir, config)?,
        claims: load_collection(project_dir, config)?,
        claim_transactions: load_collection(project_dir, config)?,
        encounters: load_collection(project_dir, config)?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::raw::{RawPatient, RawPayer};
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn config(yaml: &str) -> ProjectConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_reads_rows_with_bom_and_extra_columns() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("patients.csv");
        fs::write(
            &path,
            "\u{feff}patient_id,first_name,last_name,date_of_birth,ssn\nP1, ana ,,2000-03-01,x\n",
        )?;

        let rows: Vec<RawPatient> = read_raw_csv(&path)?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].patient_id.as_deref(), Some("P1"));
        assert_eq!(rows[0].first_name.as_deref(), Some(" ana "));
        assert_eq!(rows[0].last_name, None);
        Ok(())
    }

    #[test]
    fn test_missing_column_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("payers.csv");
        fs::write(&path, "payer_id\nPAY1\n")?;

        let result: Result<Vec<RawPayer>, _> = read_raw_csv(&path);
        assert!(matches!(
            result,
            Err(ClaimstarError::Domain(DomainError::MissingColumn { column, .. })) if column == "payer_name"
        ));
        Ok(())
    }

    #[test]
    fn test_required_and_optional_sources() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("data/raw"))?;
        fs::write(dir.path().join("data/raw/payers.csv"), "payer_id,payer_name\n")?;

        let strict = config("name: t\n");
        let empty: Result<Vec<RawPayer>, _> = load_collection(dir.path(), &strict);
        assert!(matches!(
            empty,
            Err(ClaimstarError::Domain(DomainError::EmptyInput(_)))
        ));
        let absent: Result<Vec<RawPatient>, _> = load_collection(dir.path(), &strict);
        assert!(absent.is_err());

        let lenient = config("name: t\nsources:\n  payers: { required: false }\n  patients: { required: false }\n");
        let payers: Vec<RawPayer> = load_collection(dir.path(), &lenient)?;
        let patients: Vec<RawPatient> = load_collection(dir.path(), &lenient)?;
        assert!(payers.is_empty());
        assert!(patients.is_empty());
        Ok(())
    }
}
