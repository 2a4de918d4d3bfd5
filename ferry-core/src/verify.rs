//! Post-install verification of the new environment.
//!
//! Three independent probes: the interpreter version, an import smoke test
//! of the project's own package, and the test runner's version. The first
//! two decide [`VerificationReport::verified`]; the test runner is a warning
//! only. Verification is advisory, the migration carries on regardless.

use serde::Serialize;

use crate::config::FerryConfig;
use crate::preflight::{Check, CheckStatus};
use crate::process::{CommandRunner, OutputMode, ProcessOutput};

/// Outcome of the verification step.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    /// Individual probe results.
    pub checks: Vec<Check>,
    /// False when the interpreter or import probe failed.
    pub verified: bool,
}

/// Build the import smoke-test command for `module`.
pub fn import_command(config: &FerryConfig, module: &str) -> String {
    format!(
        "{} python -c 'import {}; print(\"{} import successful\")'",
        config.tools.run_prefix, module, module
    )
}

/// Run all verification probes.
pub fn verify_installation<R: CommandRunner + ?Sized>(
    config: &FerryConfig,
    runner: &R,
) -> VerificationReport {
    log::info!("Verifying installation");
    let mut checks = Vec::with_capacity(3);

    checks.push(match probe(config, runner, &config.tools.python_version) {
        Ok(out) => Check::new("Python", CheckStatus::Pass, out.first_line().unwrap_or("ok")),
        Err(reason) => Check::new(
            "Python",
            CheckStatus::Fail,
            format!("{} environment not working: {}", config.tools.new_tool, reason),
        ),
    });

    checks.push(match config.import_module() {
        Some(module) => match probe(config, runner, &import_command(config, &module)) {
            Ok(_) => Check::new("Import", CheckStatus::Pass, format!("{}: OK", module)),
            Err(reason) => Check::new(
                "Import",
                CheckStatus::Fail,
                format!("{} import failed: {}", module, reason),
            ),
        },
        None => Check::new(
            "Import",
            CheckStatus::Warn,
            "Skipped: could not determine the module name (set project.import_module)",
        ),
    });

    checks.push(match probe(config, runner, &config.tools.test_runner_version) {
        Ok(out) => Check::new("Test Runner", CheckStatus::Pass, out.first_line().unwrap_or("ok")),
        Err(reason) => Check::new(
            "Test Runner",
            CheckStatus::Warn,
            format!("Not available: {}", reason),
        ),
    });

    for check in &checks {
        match check.status {
            CheckStatus::Pass => log::info!("{}: {}", check.name, check.detail),
            CheckStatus::Warn => log::warn!("{}: {}", check.name, check.detail),
            CheckStatus::Fail => log::error!("{}: {}", check.name, check.detail),
        }
    }

    let verified = !checks.iter().any(|c| c.status == CheckStatus::Fail);
    if !verified {
        log::warn!("Installation may have issues, but basic setup is complete");
    }

    VerificationReport { checks, verified }
}

/// Run a captured probe, folding spawn errors and non-zero exits into a reason.
fn probe<R: CommandRunner + ?Sized>(
    config: &FerryConfig,
    runner: &R,
    command: &str,
) -> std::result::Result<ProcessOutput, String> {
    match runner.run(command, &config.project.root, OutputMode::Capture) {
        Ok(out) if out.success => Ok(out),
        Ok(out) => Err(out.failure_detail()),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;

    fn config() -> FerryConfig {
        let mut config = FerryConfig::default();
        config.project.import_module = Some("themefinder".to_string());
        config
    }

    #[test]
    fn test_import_command() {
        assert_eq!(
            import_command(&config(), "themefinder"),
            "uv run python -c 'import themefinder; print(\"themefinder import successful\")'"
        );
    }

    #[test]
    fn test_all_probes_pass() {
        let config = config();
        let runner = ScriptedRunner::default()
            .ok("uv run python --version", "Python 3.12.4\n")
            .ok(&import_command(&config, "themefinder"), "ok")
            .ok("uv run pytest --version", "pytest 8.3.2\n");

        let report = verify_installation(&config, &runner);

        assert!(report.verified);
        assert_eq!(report.checks[0].detail, "Python 3.12.4");
        assert_eq!(report.checks[1].detail, "themefinder: OK");
        assert_eq!(report.checks[2].detail, "pytest 8.3.2");
    }

    #[test]
    fn test_missing_test_runner_only_warns() {
        let config = config();
        let runner = ScriptedRunner::default()
            .ok("uv run python --version", "Python 3.12.4")
            .ok(&import_command(&config, "themefinder"), "ok")
            .fail("uv run pytest --version", 2, "No module named pytest");

        let report = verify_installation(&config, &runner);

        assert!(report.verified);
        assert_eq!(report.checks[2].status, CheckStatus::Warn);
    }

    #[test]
    fn test_probes_are_independent() {
        let config = config();
        let runner = ScriptedRunner::default()
            .fail("uv run python --version", 1, "")
            .ok("uv run pytest --version", "pytest 8.3.2");

        let report = verify_installation(&config, &runner);

        assert!(!report.verified);
        assert_eq!(runner.calls.borrow().len(), 3);
        let statuses: Vec<_> = report.checks.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![CheckStatus::Fail, CheckStatus::Fail, CheckStatus::Pass]
        );
    }
}
