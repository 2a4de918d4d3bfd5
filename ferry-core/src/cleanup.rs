//! Removal of backups and the old tool's environment after a migration.

use std::path::PathBuf;

use serde::Serialize;

use crate::backup::backup_pairs;
use crate::config::FerryConfig;
use crate::error::Result;

/// Outcome of the cleanup step.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    /// Whether cleanup was requested for this run.
    pub requested: bool,
    /// Paths removed, relative to the project root.
    pub removed: Vec<PathBuf>,
}

/// Paths cleanup removes when present: both backups, then the old environment.
pub fn cleanup_targets(config: &FerryConfig) -> Vec<PathBuf> {
    let mut targets: Vec<PathBuf> = backup_pairs(config)
        .into_iter()
        .map(|(_, backup)| backup)
        .collect();
    targets.push(config.paths.old_env_dir.clone());
    targets
}

/// Remove backup files and the old environment directory if `requested`.
///
/// When not requested nothing is touched and the backups stay in place.
pub fn cleanup(config: &FerryConfig, requested: bool) -> Result<CleanupReport> {
    if !requested {
        log::info!("Keeping backup files (use --cleanup to remove them)");
        return Ok(CleanupReport::default());
    }

    log::info!("Cleaning up {} files", config.tools.old_tool);
    let mut removed = Vec::new();
    for target in cleanup_targets(config) {
        let path = config.resolve(&target);
        // symlink_metadata so a symlinked venv is unlinked, not followed.
        let meta = match std::fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };
        if meta.is_dir() {
            std::fs::remove_dir_all(&path)?;
            log::info!("Removed directory: {}", target.display());
        } else {
            std::fs::remove_file(&path)?;
            log::info!("Removed file: {}", target.display());
        }
        removed.push(target);
    }

    Ok(CleanupReport {
        requested: true,
        removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> (tempfile::TempDir, FerryConfig) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FerryConfig::default();
        config.project.root = dir.path().to_path_buf();
        std::fs::write(dir.path().join("pyproject.poetry.toml"), "a").unwrap();
        std::fs::write(dir.path().join("poetry.lock.bak"), "b").unwrap();
        std::fs::create_dir_all(dir.path().join(".venv/lib/python3.12")).unwrap();
        std::fs::write(dir.path().join(".venv/pyvenv.cfg"), "home = /usr").unwrap();
        (dir, config)
    }

    #[test]
    fn test_cleanup_removes_everything() {
        let (dir, config) = project();

        let report = cleanup(&config, true).unwrap();

        assert!(report.requested);
        assert_eq!(report.removed.len(), 3);
        assert!(!dir.path().join("pyproject.poetry.toml").exists());
        assert!(!dir.path().join("poetry.lock.bak").exists());
        assert!(!dir.path().join(".venv").exists());
    }

    #[test]
    fn test_cleanup_not_requested_keeps_files() {
        let (dir, config) = project();

        let report = cleanup(&config, false).unwrap();

        assert!(!report.requested);
        assert!(report.removed.is_empty());
        assert!(dir.path().join("pyproject.poetry.toml").exists());
        assert!(dir.path().join(".venv").exists());
    }

    #[test]
    fn test_cleanup_skips_absent_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FerryConfig::default();
        config.project.root = dir.path().to_path_buf();
        std::fs::write(dir.path().join("poetry.lock.bak"), "b").unwrap();

        let report = cleanup(&config, true).unwrap();

        assert_eq!(report.removed, vec![PathBuf::from("poetry.lock.bak")]);
    }
}
