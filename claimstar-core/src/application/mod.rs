// claimstar-core/src/application/mod.rs

pub mod clean;
pub mod pipeline;
pub mod steps;
pub mod warehouse;

#[cfg(test)]
mod fixtures;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI only needs `use claimstar_core::application::{run_project, clean_project, registry};`

pub use clean::clean_project;
pub use pipeline::{BuiltTable, RUN_RESULTS_FILE, RunResult, run_pipeline, run_project};
pub use steps::{BuildStep, IntegrityCheck, Stage, registry};
pub use warehouse::{BuildContext, Warehouse};
