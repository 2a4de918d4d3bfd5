//! Dependency installation and optional hook setup.

use serde::Serialize;

use crate::config::FerryConfig;
use crate::error::{FerryError, Result};
use crate::process::{CommandRunner, OutputMode};

/// Result of the hook installation step. Never fatal.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum HookOutcome {
    /// The hook installer ran successfully.
    Installed,
    /// Hooks were disabled in config or on the command line.
    Skipped,
    /// The hook installer could not be run or exited unsuccessfully.
    Failed(String),
}

/// Run the new tool's sync command, streaming its output to the terminal.
pub fn install_dependencies<R: CommandRunner + ?Sized>(
    config: &FerryConfig,
    runner: &R,
) -> Result<()> {
    let command = &config.tools.sync;
    log::info!("Installing dependencies with {}; command={}", config.tools.new_tool, command);

    let out = runner.run(command, &config.project.root, OutputMode::Passthrough)?;
    if !out.success {
        log::error!("Dependency installation failed; command={}, code={:?}", command, out.code);
        return Err(FerryError::InstallFailed {
            command: command.clone(),
            code: out.code,
        });
    }
    log::info!("Dependencies installed");
    Ok(())
}

/// Install the project's git hooks. Failures are logged and returned, not raised.
pub fn install_hooks<R: CommandRunner + ?Sized>(config: &FerryConfig, runner: &R) -> HookOutcome {
    if !config.hooks.enabled {
        log::info!("Hook installation disabled; skipping");
        return HookOutcome::Skipped;
    }

    let command = &config.tools.hook_install;
    log::info!("Setting up hooks; command={}", command);
    let reason = match runner.run(command, &config.project.root, OutputMode::Passthrough) {
        Ok(out) if out.success => {
            log::info!("Hooks installed");
            return HookOutcome::Installed;
        }
        Ok(out) => out.failure_detail(),
        Err(e) => e.to_string(),
    };
    log::warn!("Failed to install hooks (this is optional): {}", reason);
    HookOutcome::Failed(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;

    #[test]
    fn test_install_streams_output() {
        let config = FerryConfig::default();
        let runner = ScriptedRunner::default().ok("uv sync --dev", "");
        install_dependencies(&config, &runner).unwrap();
        assert_eq!(
            runner.calls.borrow()[0],
            ("uv sync --dev".to_string(), OutputMode::Passthrough)
        );
    }

    #[test]
    fn test_install_failure_is_fatal() {
        let config = FerryConfig::default();
        let runner = ScriptedRunner::default().fail("uv sync --dev", 2, "");
        let err = install_dependencies(&config, &runner).unwrap_err();
        assert!(matches!(err, FerryError::InstallFailed { code: Some(2), .. }));
    }

    #[test]
    fn test_hook_failure_is_advisory() {
        let config = FerryConfig::default();
        let runner = ScriptedRunner::default().fail("uv run pre-commit install", 1, "no .git");
        assert_eq!(
            install_hooks(&config, &runner),
            HookOutcome::Failed("exit status 1: no .git".to_string())
        );
    }

    #[test]
    fn test_hook_spawn_failure_is_advisory() {
        let config = FerryConfig::default();
        let runner = ScriptedRunner::default();
        assert!(matches!(install_hooks(&config, &runner), HookOutcome::Failed(_)));
    }

    #[test]
    fn test_hooks_disabled() {
        let mut config = FerryConfig::default();
        config.hooks.enabled = false;
        let runner = ScriptedRunner::default();
        assert_eq!(install_hooks(&config, &runner), HookOutcome::Skipped);
        assert!(runner.calls.borrow().is_empty());
    }
}
