pub mod project;

pub use project::{
    DateRangeConfig, ProjectConfig, SourceConfig, apply_env_overrides, load_project_config,
};
