// claimstar-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum ClaimstarError {
    // Referential rules, build graph, integrity checks
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // IO, parsing, database
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    UnsafePath(String),
}

impl From<std::io::Error> for ClaimstarError {
    fn from(err: std::io::Error) -> Self {
        ClaimstarError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<duckdb::Error> for ClaimstarError {
    fn from(err: duckdb::Error) -> Self {
        ClaimstarError::Infrastructure(InfrastructureError::from(err))
    }
}
