//! Error types for ferry operations.

use std::path::PathBuf;

use thiserror::Error;

/// All error types that ferry operations can produce.
#[derive(Error, Debug)]
pub enum FerryError {
    /// Invalid or missing configuration (TOML parse errors, bad env values, etc.).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The project marker file is absent, so this is not the expected kind of project.
    #[error("No {} found. Are you in the project root?", .path.display())]
    MarkerMissing { path: PathBuf },

    /// The new package manager could not be invoked.
    #[error("{tool} not found or not working: {detail}")]
    ToolUnavailable { tool: String, detail: String },

    /// The pre-authored target configuration to swap in does not exist.
    #[error("{} not found. Cannot proceed.", .path.display())]
    TargetConfigMissing { path: PathBuf },

    /// The dependency sync command exited unsuccessfully.
    #[error("Failed to install dependencies: '{command}' exited with {}", format_code(.code))]
    InstallFailed { command: String, code: Option<i32> },

    /// An external command could not be started at all.
    #[error("Failed to run '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A filesystem operation failed (copying, removing, reading).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The user interrupted the run.
    #[error("Migration cancelled by user")]
    Interrupted,

    /// A dry run found a step that would stop the migration.
    #[error("Dry run found {count} blocking step(s): {details}")]
    PlanBlocked { count: usize, details: String },
}

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl FerryError {
    /// Whether this error can leave the project partially migrated, so the
    /// user needs instructions for restoring from backups.
    pub fn needs_restore(&self) -> bool {
        // Prerequisite probes fold spawn failures into `ToolUnavailable`, so a
        // `CommandSpawn` here comes from the sync after the swap.
        matches!(
            self,
            FerryError::InstallFailed { .. }
                | FerryError::CommandSpawn { .. }
                | FerryError::IoError(_)
        )
    }
}

/// Convenience type alias for `Result<T, FerryError>`.
pub type Result<T> = std::result::Result<T, FerryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_failed_message() {
        let err = FerryError::InstallFailed {
            command: "uv sync --dev".to_string(),
            code: Some(2),
        };
        assert_eq!(
            err.to_string(),
            "Failed to install dependencies: 'uv sync --dev' exited with status 2"
        );
        assert!(err.needs_restore());
    }

    #[test]
    fn test_marker_missing_is_not_restorable() {
        let err = FerryError::MarkerMissing {
            path: PathBuf::from("pyproject.toml"),
        };
        assert!(err.to_string().contains("pyproject.toml"));
        assert!(!err.needs_restore());
    }

    #[test]
    fn test_spawn_failure_is_restorable() {
        let err = FerryError::CommandSpawn {
            command: "uv sync --dev".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "sh gone"),
        };
        assert_eq!(err.to_string(), "Failed to run 'uv sync --dev': sh gone");
        assert!(err.needs_restore());
    }
}
