//! Dry run: describe what a migration would do without doing it.
//!
//! Only the read-only prerequisite probes are executed. Every mutating
//! step is reported with the action it would take, whether it would be
//! skipped, or why it would stop the run.

use serde::Serialize;

use crate::backup::backup_pairs;
use crate::cleanup::cleanup_targets;
use crate::commands::migrate::MigrateOptions;
use crate::config::FerryConfig;
use crate::error::Result;
use crate::preflight::{already_migrated, run_preflight, PreflightReport};
use crate::process::CommandRunner;
use crate::verify::import_command;

/// Planned disposition of a step.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum PlanStatus {
    /// The step would run.
    Run,
    /// The step would be skipped.
    Skip,
    /// The step would stop the migration.
    Blocked,
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanStatus::Run => write!(f, "RUN"),
            PlanStatus::Skip => write!(f, "SKIP"),
            PlanStatus::Blocked => write!(f, "BLOCKED"),
        }
    }
}

/// A single planned action.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    /// Workflow step name.
    pub step: String,
    pub status: PlanStatus,
    /// The file operation or command line involved.
    pub detail: String,
}

/// Dry-run report.
#[derive(Debug, Serialize)]
pub struct ExplainReport {
    /// Prerequisite check results (these probes did run).
    pub preflight: PreflightReport,
    /// True when the project is already migrated and `force` is off.
    pub already_migrated: bool,
    /// Planned steps in execution order.
    pub steps: Vec<PlannedStep>,
}

impl ExplainReport {
    /// Steps that would stop the migration.
    pub fn blocked(&self) -> impl Iterator<Item = &PlannedStep> {
        self.steps.iter().filter(|s| s.status == PlanStatus::Blocked)
    }
}

/// Build the dry-run plan.
pub fn execute<R: CommandRunner + ?Sized>(
    config: &FerryConfig,
    runner: &R,
    options: MigrateOptions,
) -> Result<ExplainReport> {
    let preflight = run_preflight(config, runner)?;
    let skip_all = already_migrated(config) && !options.force;

    let mut steps = Vec::new();
    let mut push = |step: &str, status: PlanStatus, detail: String| {
        let status = if skip_all { PlanStatus::Skip } else { status };
        steps.push(PlannedStep {
            step: step.to_string(),
            status,
            detail,
        });
    };

    for (original, backup) in backup_pairs(config) {
        if config.resolve(&original).is_file() {
            push(
                "Backup",
                PlanStatus::Run,
                format!("copy {} → {}", original.display(), backup.display()),
            );
        } else {
            push(
                "Backup",
                PlanStatus::Skip,
                format!("{} not present", original.display()),
            );
        }
    }

    let target = &config.paths.target_config;
    if config.resolve(target).is_file() {
        push(
            "Swap",
            PlanStatus::Run,
            format!("copy {} → {}", target.display(), config.paths.config.display()),
        );
    } else {
        push(
            "Swap",
            PlanStatus::Blocked,
            format!("{} not found", target.display()),
        );
    }

    push("Install", PlanStatus::Run, config.tools.sync.clone());

    if config.hooks.enabled {
        push("Hooks", PlanStatus::Run, config.tools.hook_install.clone());
    } else {
        push("Hooks", PlanStatus::Skip, "disabled".to_string());
    }

    push("Verify", PlanStatus::Run, config.tools.python_version.clone());
    match config.import_module() {
        Some(module) => push("Verify", PlanStatus::Run, import_command(config, &module)),
        None => push("Verify", PlanStatus::Skip, "import module unknown".to_string()),
    }
    push("Verify", PlanStatus::Run, config.tools.test_runner_version.clone());

    for path in cleanup_targets(config) {
        let status = if options.cleanup && config.resolve(&path).exists() {
            PlanStatus::Run
        } else {
            PlanStatus::Skip
        };
        push("Cleanup", status, format!("remove {}", path.display()));
    }

    Ok(ExplainReport {
        preflight,
        already_migrated: skip_all,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;

    fn project() -> (tempfile::TempDir, FerryConfig) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FerryConfig::default();
        config.project.root = dir.path().to_path_buf();
        config.project.import_module = Some("app".to_string());
        std::fs::write(dir.path().join("pyproject.toml"), "poetry").unwrap();
        (dir, config)
    }

    #[test]
    fn test_plan_only_runs_probes() {
        let (dir, config) = project();
        std::fs::write(dir.path().join("pyproject.uv.toml"), "uv").unwrap();
        let runner = ScriptedRunner::default().ok("uv --version", "uv 0.5.0");

        let report = execute(&config, &runner, MigrateOptions::default()).unwrap();

        assert_eq!(runner.calls.borrow().len(), 2);
        assert_eq!(report.blocked().count(), 0);
        assert_eq!(report.steps[0].status, PlanStatus::Run);
        assert_eq!(report.steps[1].status, PlanStatus::Skip);
        assert!(!dir.path().join("pyproject.poetry.toml").exists());
    }

    #[test]
    fn test_missing_target_is_blocked() {
        let (_dir, config) = project();
        let runner = ScriptedRunner::default().ok("uv --version", "uv 0.5.0");

        let report = execute(&config, &runner, MigrateOptions::default()).unwrap();

        let blocked: Vec<_> = report.blocked().collect();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].step, "Swap");
    }

    #[test]
    fn test_already_migrated_skips_everything() {
        let (dir, config) = project();
        std::fs::write(dir.path().join("uv.lock"), "").unwrap();
        let runner = ScriptedRunner::default().ok("uv --version", "uv 0.5.0");

        let report = execute(&config, &runner, MigrateOptions::default()).unwrap();

        assert!(report.already_migrated);
        assert!(report.steps.iter().all(|s| s.status == PlanStatus::Skip));
    }
}
