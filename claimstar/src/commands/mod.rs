// claimstar/src/commands/mod.rs

pub mod clean;
pub mod inspect;
pub mod plan;
pub mod run;
