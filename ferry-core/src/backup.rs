//! Backups of the old tool's files, taken before anything is overwritten.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::FerryConfig;
use crate::error::Result;

/// One backed-up file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BackupRecord {
    /// Original path, relative to the project root.
    pub original: PathBuf,
    /// Backup path, relative to the project root.
    pub backup: PathBuf,
    /// False when the original did not exist and nothing was copied.
    pub created: bool,
}

/// The (original, backup) pairs, in the order they are copied.
pub fn backup_pairs(config: &FerryConfig) -> [(PathBuf, PathBuf); 2] {
    [
        (config.paths.config.clone(), config.paths.config_backup.clone()),
        (config.paths.old_lock.clone(), config.paths.old_lock_backup.clone()),
    ]
}

/// Copy each existing original to its backup name.
///
/// Absent originals are skipped silently. An existing backup is
/// overwritten, so a forced re-run backs up the current state.
pub fn create_backups(config: &FerryConfig) -> Result<Vec<BackupRecord>> {
    let mut records = Vec::new();
    for (original, backup) in backup_pairs(config) {
        let src = config.resolve(&original);
        let created = if src.is_file() {
            // fs::copy also copies permission bits.
            std::fs::copy(&src, config.resolve(&backup))?;
            log::info!("Backed up {} → {}", original.display(), backup.display());
            true
        } else {
            log::debug!("Nothing to back up; path={}", original.display());
            false
        };
        records.push(BackupRecord {
            original,
            backup,
            created,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backs_up_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FerryConfig::default();
        config.project.root = dir.path().to_path_buf();
        std::fs::write(dir.path().join("pyproject.toml"), "[tool.poetry]\n").unwrap();
        std::fs::write(dir.path().join("poetry.lock"), "# lock\n").unwrap();

        let records = create_backups(&config).unwrap();

        assert!(records.iter().all(|r| r.created));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("pyproject.poetry.toml")).unwrap(),
            "[tool.poetry]\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("poetry.lock.bak")).unwrap(),
            "# lock\n"
        );
    }

    #[test]
    fn test_missing_originals_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FerryConfig::default();
        config.project.root = dir.path().to_path_buf();
        std::fs::write(dir.path().join("pyproject.toml"), "x").unwrap();

        let records = create_backups(&config).unwrap();

        assert_eq!(
            records,
            vec![
                BackupRecord {
                    original: PathBuf::from("pyproject.toml"),
                    backup: PathBuf::from("pyproject.poetry.toml"),
                    created: true,
                },
                BackupRecord {
                    original: PathBuf::from("poetry.lock"),
                    backup: PathBuf::from("poetry.lock.bak"),
                    created: false,
                },
            ]
        );
        assert!(!dir.path().join("poetry.lock.bak").exists());
    }
}
