// claimstar-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Circular dependency detected involving: {0}")]
    #[diagnostic(
        code(claimstar::domain::cycle),
        help("Check the dependency lists of the build steps.")
    )]
    CircularDependency(String),

    #[error("Step '{step}' depends on unknown step '{dependency}'")]
    #[diagnostic(code(claimstar::domain::unknown_dependency))]
    UnknownDependency { step: String, dependency: String },

    #[error("Step '{0}' is declared more than once")]
    #[diagnostic(code(claimstar::domain::duplicate_step))]
    DuplicateStep(String),

    #[error("Table '{0}' is not part of the build registry")]
    #[diagnostic(
        code(claimstar::domain::step_not_found),
        help("Run `claimstar plan` to list the buildable tables.")
    )]
    StepNotFound(String),

    #[error("Step '{step}' needs '{input}', which has not been built in this run")]
    #[diagnostic(
        code(claimstar::domain::missing_input),
        help("Declare '{input}' as a dependency of '{step}'.")
    )]
    MissingInput { step: String, input: String },

    #[error("Required raw collection '{0}' is empty")]
    #[diagnostic(
        code(claimstar::domain::empty_input),
        help("Provide at least one row, or mark the source as `required: false`.")
    )]
    EmptyInput(String),

    #[error("Raw collection '{collection}' is missing expected column '{column}'")]
    #[diagnostic(code(claimstar::domain::missing_column))]
    MissingColumn { collection: String, column: String },

    #[error("Schema drift on '{table}': expected [{expected}], store has [{actual}]")]
    #[diagnostic(code(claimstar::domain::schema_drift))]
    SchemaDrift {
        table: String,
        expected: String,
        actual: String,
    },

    #[error("Integrity check '{check}' failed on '{table}': {violations} offending row(s)")]
    #[diagnostic(
        code(claimstar::domain::integrity),
        help("Surrogate keys must be unique and every fact key must resolve to a dimension row or -1.")
    )]
    IntegrityViolation {
        table: String,
        check: String,
        violations: i64,
    },
}
