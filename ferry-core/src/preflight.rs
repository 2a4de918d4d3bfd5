//! Prerequisite checks run before anything is touched.
//!
//! Confirms the working directory is the expected kind of project, that the
//! new package manager can be invoked, and whether the old one is around.
//! Nothing here mutates the filesystem.

use serde::Serialize;

use crate::config::FerryConfig;
use crate::error::{FerryError, Result};
use crate::process::{CommandRunner, OutputMode};

/// Result of a single prerequisite or verification check.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    /// Human-readable name of the check (e.g. "Project Marker").
    pub name: String,
    /// Whether the check passed, warned, or failed.
    pub status: CheckStatus,
    /// Descriptive detail about the check result.
    pub detail: String,
}

impl Check {
    pub fn new(name: &str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
        }
    }
}

/// Status of a check.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum CheckStatus {
    /// The check passed.
    Pass,
    /// The check produced a non-blocking warning.
    Warn,
    /// The check failed.
    Fail,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "PASS"),
            CheckStatus::Warn => write!(f, "WARN"),
            CheckStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// Outcome of a successful prerequisite run.
#[derive(Debug, Clone, Serialize)]
pub struct PreflightReport {
    /// Individual check results, in the order they ran.
    pub checks: Vec<Check>,
    /// Version line reported by the new tool.
    pub new_tool_version: String,
    /// Version line reported by the old tool, if it was found.
    pub old_tool_version: Option<String>,
}

/// Run the prerequisite checks.
///
/// A missing marker file or an uninvocable new tool stops the run with an
/// error; a missing old tool only produces a warning.
pub fn run_preflight<R: CommandRunner + ?Sized>(
    config: &FerryConfig,
    runner: &R,
) -> Result<PreflightReport> {
    let root = &config.project.root;
    let mut checks = Vec::new();

    let marker = config.resolve(&config.paths.marker);
    if !marker.exists() {
        log::error!("Project marker missing; path={}", marker.display());
        return Err(FerryError::MarkerMissing {
            path: config.paths.marker.clone(),
        });
    }
    checks.push(Check::new(
        "Project Marker",
        CheckStatus::Pass,
        format!("{} found", config.paths.marker.display()),
    ));

    let tool = &config.tools.new_tool;
    let new_tool_version = match runner.run(&config.tools.new_tool_version, root, OutputMode::Capture) {
        Ok(out) if out.success => out.first_line().unwrap_or(tool).to_string(),
        Ok(out) => {
            return Err(FerryError::ToolUnavailable {
                tool: tool.clone(),
                detail: out.failure_detail(),
            })
        }
        Err(e) => {
            return Err(FerryError::ToolUnavailable {
                tool: tool.clone(),
                detail: e.to_string(),
            })
        }
    };
    log::info!("{} found; version={}", tool, new_tool_version);
    checks.push(Check::new(
        &format!("{} Available", capitalize(tool)),
        CheckStatus::Pass,
        new_tool_version.clone(),
    ));

    let old = &config.tools.old_tool;
    let old_tool_version = match runner.run(&config.tools.old_tool_version, root, OutputMode::Capture) {
        Ok(out) if out.success => Some(out.first_line().unwrap_or(old).to_string()),
        _ => None,
    };
    match old_tool_version {
        Some(ref v) => {
            log::info!("{} found; version={}", old, v);
            checks.push(Check::new(
                &format!("{} Available", capitalize(old)),
                CheckStatus::Pass,
                v.clone(),
            ));
        }
        None => {
            log::warn!("{} not found (this is OK if you're setting up fresh)", old);
            checks.push(Check::new(
                &format!("{} Available", capitalize(old)),
                CheckStatus::Warn,
                format!("{} not found (this is OK if you're setting up fresh)", old),
            ));
        }
    }

    Ok(PreflightReport {
        checks,
        new_tool_version,
        old_tool_version,
    })
}

/// Whether the new tool's lock file shows a previous migration completed.
pub fn already_migrated(config: &FerryConfig) -> bool {
    config.resolve(&config.paths.new_lock).exists()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
