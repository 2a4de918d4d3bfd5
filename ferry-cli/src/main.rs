//! CLI entry point for the ferry migration tool.
//! Parses flags, loads configuration, runs the migration on a blocking
//! task raced against Ctrl+C, and maps failures to exit status 1.

mod output;

use std::future::Future;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use ferry_core::config::{CliOverrides, FerryConfig};
use ferry_core::error::FerryError;
use ferry_core::{Ferry, MigrateOptions, ShellRunner};

/// Command-line flags.
#[derive(Parser, Debug)]
#[command(
    name = "ferry",
    about = "Migrate a Python project from Poetry to uv",
    version = concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_HASH"), " ", env!("BUILD_TIME"), ")"
    )
)]
struct Cli {
    /// Remove backup files and the old virtual environment after a successful migration
    #[arg(long)]
    cleanup: bool,

    /// Migrate even if uv configuration already exists
    #[arg(long)]
    force: bool,

    /// Config file path (default: ferry.toml in the project directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Project directory to migrate (default: current directory)
    #[arg(long, value_name = "DIR")]
    project_dir: Option<PathBuf>,

    /// Python module imported by the verification smoke test
    #[arg(long, value_name = "MODULE")]
    import_module: Option<String>,

    /// Skip hook installation
    #[arg(long)]
    no_hooks: bool,

    /// Show what would be done without making changes
    #[arg(long)]
    dry_run: bool,

    /// Output the final report as JSON
    #[arg(long)]
    json: bool,

    /// Suppress non-essential output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable verbose/debug output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging (suppress when JSON output is requested)
    let filter = if cli.json {
        "error"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    env_logger::Builder::new()
        .parse_env(env_logger::Env::default().default_filter_or(filter))
        .format_target(false)
        .format_timestamp(None)
        .init();

    let overrides = CliOverrides {
        project_dir: cli.project_dir.clone(),
        import_module: cli.import_module.clone(),
        hooks_enabled: if cli.no_hooks { Some(false) } else { None },
    };

    let config = match FerryConfig::load(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&e, &FerryConfig::default());
            process::exit(1);
        }
    };

    if !cli.json && !cli.quiet {
        output::print_banner(&config);
    }

    let paths_for_errors = config.clone();
    let workflow = tokio::task::spawn_blocking(move || run(&cli, config));

    let code = match finish_or_interrupt(workflow, interrupted()).await {
        Finish::Interrupted => {
            output::print_error(&FerryError::Interrupted, &paths_for_errors);
            1
        }
        Finish::Done(Ok(Ok(()))) => 0,
        Finish::Done(Ok(Err(e))) => {
            output::print_error(&e, &paths_for_errors);
            1
        }
        Finish::Done(Err(join_err)) => {
            // A panic inside a step is an unexpected fault; the project
            // may be half-migrated.
            output::print_fault(&join_err.to_string(), &paths_for_errors);
            1
        }
    };

    process::exit(code);
}

/// How the workflow race ended.
enum Finish<T> {
    Interrupted,
    Done(T),
}

/// Await `work` unless `interrupt` resolves first.
///
/// Ctrl+C also kills the running child, so both can be ready in the same
/// poll; the interrupt wins.
async fn finish_or_interrupt<T>(
    work: impl Future<Output = T>,
    interrupt: impl Future<Output = ()>,
) -> Finish<T> {
    tokio::select! {
        biased;
        _ = interrupt => Finish::Interrupted,
        out = work => Finish::Done(out),
    }
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Could not listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Run the migration (or dry run) and print its report.
fn run(cli: &Cli, config: FerryConfig) -> Result<(), FerryError> {
    let options = MigrateOptions {
        force: cli.force,
        cleanup: cli.cleanup,
    };
    let runner = ShellRunner::new().with_stdout_to_stderr(cli.json);
    let ferry = Ferry::with_runner(config, runner);

    if cli.dry_run {
        let report = ferry.explain(options)?;
        if cli.json {
            output::print_json(&report);
        } else {
            output::print_explain_report(&report);
        }
        let blocked: Vec<_> = report.blocked().collect();
        if !blocked.is_empty() {
            return Err(FerryError::PlanBlocked {
                count: blocked.len(),
                details: blocked
                    .iter()
                    .map(|s| format!("{}: {}", s.step, s.detail))
                    .collect::<Vec<_>>()
                    .join("; "),
            });
        }
        return Ok(());
    }

    let outcome = ferry.migrate(options)?;
    if cli.json {
        output::print_json(&outcome);
    } else {
        output::print_outcome(&outcome, &ferry.config, cli.quiet);
    }
    Ok(())
}
