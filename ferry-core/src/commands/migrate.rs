//! Run the full migration workflow.
//!
//! Steps run strictly in order: prerequisites, already-migrated check,
//! backup, configuration swap, dependency install, hook setup,
//! verification, cleanup. Prerequisites, the swap, and the install are
//! fatal gates; hooks and verification only warn.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::backup::{create_backups, BackupRecord};
use crate::cleanup::{cleanup, CleanupReport};
use crate::config::FerryConfig;
use crate::error::Result;
use crate::install::{install_dependencies, install_hooks, HookOutcome};
use crate::preflight::{already_migrated, run_preflight, PreflightReport};
use crate::process::CommandRunner;
use crate::swap::swap_configuration;
use crate::verify::{verify_installation, VerificationReport};

/// Options for a migrate run.
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrateOptions {
    /// Migrate even if the new tool's lock file already exists.
    pub force: bool,
    /// Remove backups and the old environment after a successful run.
    pub cleanup: bool,
}

/// Report returned after a completed migration.
#[derive(Debug, Serialize)]
pub struct MigrateReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the whole run in milliseconds.
    pub total_time_ms: u128,
    /// Prerequisite check results.
    pub preflight: PreflightReport,
    /// Files backed up before the swap.
    pub backups: Vec<BackupRecord>,
    /// Result of hook installation.
    pub hooks: HookOutcome,
    /// Post-install verification results.
    pub verification: VerificationReport,
    /// What cleanup removed, if it was requested.
    pub cleanup: CleanupReport,
}

/// What a migrate run ended up doing.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MigrateOutcome {
    /// The new tool's lock file was already present and `force` was not set.
    AlreadyMigrated {
        preflight: PreflightReport,
        lock_file: std::path::PathBuf,
    },
    /// Every step ran.
    Completed(MigrateReport),
}

/// Execute the migrate command.
pub fn execute<R: CommandRunner + ?Sized>(
    config: &FerryConfig,
    runner: &R,
    options: MigrateOptions,
) -> Result<MigrateOutcome> {
    let started_at = Utc::now();
    let timer = Instant::now();

    let preflight = run_preflight(config, runner)?;

    if already_migrated(config) && !options.force {
        log::info!(
            "{} configuration already exists; use --force to re-run migration",
            config.tools.new_tool
        );
        return Ok(MigrateOutcome::AlreadyMigrated {
            preflight,
            lock_file: config.paths.new_lock.clone(),
        });
    }
    if options.force {
        log::debug!("Force enabled; ignoring existing {}", config.paths.new_lock.display());
    }

    let result = run_steps(config, runner, options);
    match &result {
        Ok(_) => log::info!("Migration completed; total_time_ms={}", timer.elapsed().as_millis()),
        Err(e) => log::error!("Migration failed: {}", e),
    }
    let (backups, hooks, verification, cleanup) = result?;

    Ok(MigrateOutcome::Completed(MigrateReport {
        started_at,
        total_time_ms: timer.elapsed().as_millis(),
        preflight,
        backups,
        hooks,
        verification,
        cleanup,
    }))
}

type StepResults = (Vec<BackupRecord>, HookOutcome, VerificationReport, CleanupReport);

/// The mutating part of the workflow, from the first backup onwards.
fn run_steps<R: CommandRunner + ?Sized>(
    config: &FerryConfig,
    runner: &R,
    options: MigrateOptions,
) -> Result<StepResults> {
    log::info!("Creating backups");
    let backups = create_backups(config)?;

    log::info!("Setting up {} configuration", config.tools.new_tool);
    swap_configuration(config)?;

    install_dependencies(config, runner)?;

    let hooks = install_hooks(config, runner);
    let verification = verify_installation(config, runner);
    let cleanup_report = cleanup(config, options.cleanup)?;

    Ok((backups, hooks, verification, cleanup_report))
}
