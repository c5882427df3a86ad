//! depmatrix - Cross-project dependency compatibility matrix CLI
//!
//! Discovers the declared dependencies of a set of packages, folds them
//! into jointly allowed ranges and reports which projects fit.

use clap::Parser;
use depmatrix::cli::CliArgs;
use depmatrix::config::Settings;
use depmatrix::error::AppError;
use depmatrix::orchestrator::Orchestrator;
use depmatrix::output::{create_formatter, CheckOutcome, OutputConfig};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

/// Exit code for failed dependency discovery
const DISCOVERY_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_level())),
        )
        .with_writer(io::stderr)
        .init();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            match e.downcast_ref::<AppError>() {
                Some(AppError::Discovery(_)) => ExitCode::from(DISCOVERY_FAILURE),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let color = io::stdout().is_terminal();
    if !color {
        colored::control::set_override(false);
    }

    let settings = Settings::resolve(&args)?;
    tracing::debug!(
        core = settings.core.len(),
        other = settings.other.len(),
        jobs = settings.jobs,
        "resolved settings"
    );

    let orchestrator = Orchestrator::new(settings)?.with_progress(args.show_progress());
    let formatter =
        create_formatter(OutputConfig::from_cli(args.json, args.verbose, args.quiet).with_color(color));
    let mut stdout = io::stdout().lock();

    if args.check {
        let exit_code = match orchestrator.check().await {
            Ok(registry) => {
                formatter.format_check(CheckOutcome::Installable(&registry), &mut stdout)?;
                ExitCode::SUCCESS
            }
            Err(AppError::Aggregate(conflict)) => {
                formatter.format_check(CheckOutcome::Conflict(&conflict), &mut stdout)?;
                ExitCode::FAILURE
            }
            Err(e) => return Err(e.into()),
        };
        stdout.flush()?;
        return Ok(exit_code);
    }

    let report = orchestrator.report().await?;
    formatter.format_report(&report, &mut stdout)?;
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}
