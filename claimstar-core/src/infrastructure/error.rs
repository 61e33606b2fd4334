// claimstar-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("Warehouse engine error: {0}")]
    #[diagnostic(
        code(claimstar::infra::database::duckdb),
        help("DuckDB rejected a statement while loading or checking a table.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("Refusing unsafe identifier '{0}'")]
    #[diagnostic(code(claimstar::infra::database::identifier))]
    UnsafeIdentifier(String),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(claimstar::infra::io),
        help("Check that the project, raw data and target directories are readable and writable.")
    )]
    Io(#[from] std::io::Error),

    #[error("Invalid claimstar.yaml: {0}")]
    #[diagnostic(
        code(claimstar::infra::yaml),
        help("Dates are YYYY-MM-DD and each source is a mapping with `path` and `required`.")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration rejected: {0}")]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(claimstar::infra::config_missing))]
    ConfigNotFound(String),

    #[error("Invalid project configuration: {0}")]
    #[diagnostic(code(claimstar::infra::config_invalid))]
    Validation(#[from] validator::ValidationErrors),

    #[error("Failed to read CSV '{path}': {source}")]
    #[diagnostic(
        code(claimstar::infra::csv),
        help("Raw sources must be comma-separated with a header row.")
    )]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Could not serialize run results: {0}")]
    #[diagnostic(code(claimstar::infra::json))]
    Json(#[from] serde_json::Error),
}

impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}
