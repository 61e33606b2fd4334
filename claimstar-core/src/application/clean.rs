// claimstar-core/src/application/clean.rs

use crate::error::ClaimstarError;
use crate::infrastructure::config::project::load_project_config;
use std::fs;
use std::path::{Component, Path};
use tracing::info;

/// Removes the configured build artifacts (database file, run results).
/// Returns the relative paths that were actually deleted.
pub fn clean_project(project_dir: &Path) -> Result<Vec<String>, ClaimstarError> {
    info!("Cleaning build artifacts");

    let config = load_project_config(project_dir)?;

    let targets = if config.clean_targets.is_empty() {
        vec![config.target_path.clone()]
    } else {
        config.clean_targets
    };

    let mut removed = Vec::new();
    for target_rel_path in targets {
        // Path traversal guard: only plain relative paths below the project.
        let rel = Path::new(&target_rel_path);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || rel.as_os_str().is_empty() {
            return Err(ClaimstarError::UnsafePath(target_rel_path));
        }

        let full_path = project_dir.join(rel);
        if full_path.exists() {
            if full_path.is_dir() {
                fs::remove_dir_all(&full_path)?;
            } else {
                fs::remove_file(&full_path)?;
            }
            info!(path = %target_rel_path, "Artifact removed");
            removed.push(target_rel_path);
        }
    }

    Ok(removed)
}
