//! Terminal output formatting for ferry.
//! Uses comfy-table for tabular output and colored for
//! severity-aware terminal styling.

use colored::Colorize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use serde::Serialize;

use ferry_core::config::FerryConfig;
use ferry_core::error::FerryError;
use ferry_core::{
    BackupRecord, Check, CheckStatus, CleanupReport, ExplainReport, HookOutcome, MigrateOutcome,
    MigrateReport, PlanStatus,
};

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize report: {}", e),
    }
}

/// Print the startup banner.
pub fn print_banner(config: &FerryConfig) {
    let title = format!(
        "{} → {} Migration",
        capitalize(&config.tools.old_tool),
        config.tools.new_tool
    );
    println!("{}", title.bold());
    println!("{}", "=".repeat(50).dimmed());
}

/// Print the result of a migrate run.
pub fn print_outcome(outcome: &MigrateOutcome, config: &FerryConfig, quiet: bool) {
    match outcome {
        MigrateOutcome::AlreadyMigrated { lock_file, .. } => {
            println!(
                "{}",
                format!(
                    "{} configuration already exists ({} found).",
                    config.tools.new_tool,
                    lock_file.display()
                )
                .green()
                .bold()
            );
            println!("   Use --force to re-run migration");
        }
        MigrateOutcome::Completed(report) => {
            if !quiet {
                print_summary(report, config);
            }
            print_next_steps(config);
        }
    }
}

fn print_summary(report: &MigrateReport, config: &FerryConfig) {
    println!();
    println!("{}", "Prerequisites".bold());
    print_checks(&report.preflight.checks);

    println!();
    print_backups(&report.backups);

    println!();
    match &report.hooks {
        HookOutcome::Installed => println!("{} Hooks installed", "✓".green()),
        HookOutcome::Skipped => println!("{} Hook installation skipped", "-".dimmed()),
        HookOutcome::Failed(reason) => println!(
            "{} Failed to install hooks (this is optional): {}",
            "!".yellow(),
            reason
        ),
    }

    println!();
    println!("{}", "Verification".bold());
    print_checks(&report.verification.checks);
    if !report.verification.verified {
        println!(
            "{}",
            "Installation may have issues, but basic setup is complete.".yellow()
        );
    }

    println!();
    print_cleanup(&report.cleanup, config);
}

/// Print a list of checks with status icons.
fn print_checks(checks: &[Check]) {
    for check in checks {
        let icon = match check.status {
            CheckStatus::Pass => "✓".green(),
            CheckStatus::Warn => "!".yellow(),
            CheckStatus::Fail => "✗".red(),
        };
        println!("  {} {} — {}", icon, check.name, check.detail);
    }
}

/// Print the backups taken as a table.
fn print_backups(backups: &[BackupRecord]) {
    if backups.iter().all(|b| !b.created) {
        println!("{}", "No files needed backing up.".yellow());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new("Original"), Cell::new("Backup"), Cell::new("Status")]);

    for backup in backups {
        let status = if backup.created {
            "Backed up".green().to_string()
        } else {
            "Not present".dimmed().to_string()
        };
        table.add_row(vec![
            Cell::new(backup.original.display()),
            Cell::new(backup.backup.display()),
            Cell::new(status),
        ]);
    }

    println!("{table}");
}

fn print_cleanup(report: &CleanupReport, config: &FerryConfig) {
    if !report.requested {
        println!(
            "{}",
            "Keeping backup files (use --cleanup to remove them)".dimmed()
        );
        return;
    }
    if report.removed.is_empty() {
        println!("{}", format!("No {} files to clean up.", config.tools.old_tool).green());
        return;
    }
    println!("{}", format!("Cleaned up {} file(s):", report.removed.len()).green());
    for path in &report.removed {
        println!("  {} {}", "✗".red(), path.display());
    }
}

/// Print the fixed next-steps summary.
pub fn print_next_steps(config: &FerryConfig) {
    println!();
    println!("{}", "Migration completed successfully!".green().bold());
    println!();
    println!("{}", "Next steps:".bold());
    for step in next_steps(config) {
        println!("   {}", step);
    }
    println!();
    println!("{}", "Useful commands:".bold());
    let run = &config.tools.run_prefix;
    println!("   • {} pytest        - Run tests", run);
    println!("   • {} ruff check    - Check code quality", run);
    println!("   • {} mkdocs serve  - Serve documentation", run);
    println!("   • make help            - Show all available commands");
    println!();
    println!("For more information, see DEVELOPMENT.md");
}

fn next_steps(config: &FerryConfig) -> Vec<String> {
    vec![
        "1. Update your .env file with API keys if needed".to_string(),
        "2. Test the installation: make test".to_string(),
        format!(
            "3. Try the examples: cd examples && {} python example_script.py",
            config.tools.run_prefix
        ),
        "4. Start Jupyter Lab: make jupyter".to_string(),
    ]
}

/// Print the dry-run plan.
pub fn print_explain_report(report: &ExplainReport) {
    println!("{}", "Prerequisites".bold());
    print_checks(&report.preflight.checks);
    println!();

    if report.already_migrated {
        println!(
            "{}",
            "Already migrated. Nothing would be done (use --force to re-run).".green()
        );
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new("Step"), Cell::new("Status"), Cell::new("Action")]);

    for step in &report.steps {
        let status = match step.status {
            PlanStatus::Run => step.status.to_string().green().to_string(),
            PlanStatus::Skip => step.status.to_string().dimmed().to_string(),
            PlanStatus::Blocked => step.status.to_string().red().bold().to_string(),
        };
        table.add_row(vec![
            Cell::new(&step.step),
            Cell::new(status),
            Cell::new(&step.detail),
        ]);
    }

    println!("{table}");
    println!("{}", "Dry run: no files were changed.".dimmed());
}

/// Print a formatted error message with actionable hints to stderr.
pub fn print_error(error: &FerryError, config: &FerryConfig) {
    if let FerryError::Interrupted = error {
        eprintln!();
        eprintln!("{}", error.to_string().yellow().bold());
        return;
    }

    eprintln!("{} {}", "ERROR:".red().bold(), error);

    match error {
        FerryError::ConfigError(_) => {
            eprintln!(
                "{}",
                "Hint: Check your ferry.toml or FERRY_* environment variables.".dimmed()
            );
        }
        FerryError::MarkerMissing { .. } => {
            eprintln!(
                "{}",
                "Hint: Run ferry from the project root or pass --project-dir.".dimmed()
            );
        }
        FerryError::ToolUnavailable { tool, .. } => {
            eprintln!("{}", format!("Hint: Please install {} first:", tool).dimmed());
            eprintln!("   {}", config.tools.install_hint);
        }
        FerryError::TargetConfigMissing { path } => {
            eprintln!(
                "{}",
                format!(
                    "Hint: Create {} with the {} configuration before migrating.",
                    path.display(),
                    config.tools.new_tool
                )
                .dimmed()
            );
        }
        FerryError::PlanBlocked { .. } => {
            eprintln!(
                "{}",
                "Hint: Resolve the blocked steps above, then run without --dry-run.".dimmed()
            );
        }
        _ => {}
    }

    if error.needs_restore() {
        print_restore_hint(config);
    }
}

/// Print an unexpected fault (a panic inside the workflow) with restore steps.
pub fn print_fault(detail: &str, config: &FerryConfig) {
    eprintln!("{} Migration failed: {}", "ERROR:".red().bold(), detail);
    print_restore_hint(config);
}

fn print_restore_hint(config: &FerryConfig) {
    let paths = &config.paths;
    eprintln!();
    eprintln!(
        "{}",
        "You can restore your original configuration from the backup files:".yellow()
    );
    eprintln!(
        "   cp {} {}",
        paths.config_backup.display(),
        paths.config.display()
    );
    eprintln!(
        "   cp {} {}",
        paths.old_lock_backup.display(),
        paths.old_lock.display()
    );
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_steps_include_examples() {
        let steps = next_steps(&FerryConfig::default());
        assert_eq!(steps.len(), 4);
        assert_eq!(
            steps[2],
            "3. Try the examples: cd examples && uv run python example_script.py"
        );
        assert!(steps[3].starts_with("4. Start Jupyter Lab"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("poetry"), "Poetry");
        assert_eq!(capitalize(""), "");
    }
}
