//! Migrate a Python project from Poetry to uv.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ferry_core::config::{CliOverrides, FerryConfig};
//! use ferry_core::{Ferry, MigrateOptions, MigrateOutcome};
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FerryConfig::load(None, &CliOverrides::default())?;
//! let ferry = Ferry::new(config);
//! match ferry.migrate(MigrateOptions::default())? {
//!     MigrateOutcome::AlreadyMigrated { .. } => println!("Nothing to do"),
//!     MigrateOutcome::Completed(report) => {
//!         println!("Migrated in {}ms", report.total_time_ms)
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`config`] — Configuration loading (TOML, env vars, CLI overrides)
//! - [`process`] — Shell command execution behind the [`CommandRunner`] trait
//! - [`preflight`] — Prerequisite checks and already-migrated detection
//! - [`backup`] — Backups of the old tool's files
//! - [`swap`] — Swapping in the pre-authored configuration
//! - [`install`] — Dependency sync and hook installation
//! - [`verify`] — Post-install verification probes
//! - [`cleanup`] — Removal of backups and the old environment
//! - [`commands`] — The migrate workflow and its dry run
//! - [`error`] — Error types

pub mod backup;
pub mod cleanup;
pub mod commands;
pub mod config;
pub mod error;
pub mod install;
pub mod preflight;
pub mod process;
pub mod swap;
pub mod verify;

use config::FerryConfig;
use error::Result;

pub use backup::BackupRecord;
pub use cleanup::CleanupReport;
pub use commands::explain::{ExplainReport, PlanStatus, PlannedStep};
pub use commands::migrate::{MigrateOptions, MigrateOutcome, MigrateReport};
pub use config::CliOverrides;
pub use install::HookOutcome;
pub use preflight::{Check, CheckStatus, PreflightReport};
pub use process::{CommandRunner, OutputMode, ProcessOutput, ShellRunner};
pub use verify::VerificationReport;

/// Main entry point for the ferry library.
///
/// Holds a resolved config and the runner used for every external command.
pub struct Ferry<R: CommandRunner = ShellRunner> {
    pub config: FerryConfig,
    runner: R,
}

impl Ferry<ShellRunner> {
    /// Create a Ferry that runs commands through the platform shell.
    pub fn new(config: FerryConfig) -> Self {
        Self::with_runner(config, ShellRunner::new())
    }
}

impl<R: CommandRunner> Ferry<R> {
    /// Create a Ferry with a custom command runner.
    pub fn with_runner(config: FerryConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Get a reference to the command runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run only the prerequisite checks.
    pub fn preflight(&self) -> Result<PreflightReport> {
        preflight::run_preflight(&self.config, &self.runner)
    }

    /// Run the full migration workflow.
    pub fn migrate(&self, options: MigrateOptions) -> Result<MigrateOutcome> {
        commands::migrate::execute(&self.config, &self.runner, options)
    }

    /// Describe what [`Ferry::migrate`] would do, without mutating anything.
    pub fn explain(&self, options: MigrateOptions) -> Result<ExplainReport> {
        commands::explain::execute(&self.config, &self.runner, options)
    }
}
