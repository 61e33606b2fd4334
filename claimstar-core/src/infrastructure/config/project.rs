// claimstar-core/src/infrastructure/config/project.rs

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::{Validate, ValidationError};

use crate::domain::gold::DateRange;
use crate::infrastructure::error::InfrastructureError;

/// Raw collections a project can point at.
pub const SOURCE_KEYS: [&str; 5] = [
    "patients",
    "payers",
    "claims",
    "claim_transactions",
    "encounters",
];

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    /// DuckDB file, relative to the project directory, or `:memory:`.
    #[serde(default = "default_database")]
    #[validate(length(min = 1, message = "Database path cannot be empty"))]
    pub database: String,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    #[serde(rename = "clean-targets", default = "default_clean_targets")]
    pub clean_targets: Vec<String>,

    /// Reference date for ages. Defaults to the current UTC date.
    #[serde(rename = "as-of", default)]
    pub as_of: Option<NaiveDate>,

    /// Calendar used when no fact carries a date.
    #[serde(rename = "default-date-range", default)]
    pub default_date_range: Option<DateRangeConfig>,

    #[serde(default)]
    #[validate(custom(function = "validate_source_keys"))]
    pub sources: BTreeMap<String, SourceConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DateRangeConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourceConfig {
    pub path: Option<String>,
    #[serde(default = "default_required")]
    pub required: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            required: true,
        }
    }
}

impl ProjectConfig {
    /// CSV path of a raw collection, relative to the project directory.
    pub fn source_path(&self, collection: &str) -> PathBuf {
        self.sources
            .get(collection)
            .and_then(|s| s.path.as_ref())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("data/raw/{}.csv", collection)))
    }

    pub fn is_required(&self, collection: &str) -> bool {
        self.sources
            .get(collection)
            .map(|s| s.required)
            .unwrap_or(true)
    }

    pub fn database_path(&self, project_dir: &Path) -> String {
        if self.database == ":memory:" {
            return self.database.clone();
        }
        project_dir.join(&self.database).display().to_string()
    }

    pub fn target_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.target_path)
    }

    pub fn as_of_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Configured fallback calendar, else 2020-01-01 through a year past `today`.
    pub fn fallback_date_range(&self, today: NaiveDate) -> DateRange {
        self.default_date_range
            .as_ref()
            .and_then(|r| DateRange::new(r.start, r.end))
            .unwrap_or_else(|| DateRange::default_until(today))
    }
}

fn validate_source_keys(sources: &BTreeMap<String, SourceConfig>) -> Result<(), ValidationError> {
    match sources.keys().find(|k| !SOURCE_KEYS.contains(&k.as_str())) {
        Some(unknown) => Err(ValidationError::new("unknown_source").with_message(Cow::Owned(
            format!(
                "Unknown source '{}'. Expected one of: {}",
                unknown,
                SOURCE_KEYS.join(", ")
            ),
        ))),
        None => Ok(()),
    }
}

fn default_version() -> String {
    "0.1.0".to_string()
}
fn default_database() -> String {
    "target/warehouse.duckdb".to_string()
}
fn default_target_path() -> String {
    "target".to_string()
}
fn default_clean_targets() -> Vec<String> {
    vec!["target".to_string()]
}
fn default_required() -> bool {
    true
}

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project manifest");

    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // Layering: CLAIMSTAR_DATABASE=:memory: claimstar run
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    config.validate()?;
    if let Some(range) = &config.default_date_range {
        if range.start > range.end {
            return Err(InfrastructureError::ConfigError(format!(
                "default-date-range starts after it ends ({} > {})",
                range.start, range.end
            )));
        }
    }

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    let candidates = ["claimstar_project.yaml", "claimstar.yaml"];
    for filename in candidates {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, candidates
    )))
}

pub fn apply_env_overrides(config: &mut ProjectConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("CLAIMSTAR_DATABASE") {
        info!(old = ?config.database, new = ?val, "Overriding database via ENV");
        config.database = val;
    }
    if let Some(val) = lookup("CLAIMSTAR_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
}
