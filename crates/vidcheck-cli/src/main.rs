mod commands;
mod logging;
mod progress;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use commands::Cli;
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info, warn};
use vidcheck_core::probe::FfmpegBackend;
use vidcheck_core::scanner;
use vidcheck_core::storage::{FileProgressStore, FileReport, ProgressStore};
use vidcheck_core::{AppConfig, ScanController, ScanSummary, SessionId};

fn main() -> ExitCode {
    dotenv().ok();

    let args = Cli::parse();

    let _guard = logging::init_logger();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {:#}", err);
            eprintln!("{} {:#}", "error:".red().bold(), err);
            return ExitCode::FAILURE;
        }
    };

    match run_scan(&args, &config) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Scan aborted: {:#}", err);
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Cli) -> Result<AppConfig> {
    let mut config = vidcheck_core::config::load_configuration(args.config.as_deref())?;
    if let Some(prefix) = &args.output {
        config.output_prefix = prefix.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run_scan(args: &Cli, config: &AppConfig) -> Result<ScanSummary> {
    // A bad directory argument is reported as such, even without ffmpeg installed.
    scanner::scan_root(&args.directory)?;

    let backend = FfmpegBackend::locate(
        config.ffprobe_path.as_deref(),
        config.ffmpeg_path.as_deref(),
    )
    .context("ffprobe and ffmpeg are required to decode videos")?;

    let store = FileProgressStore::new(&config.output_dir, &config.output_prefix);
    let session = resolve_session(args, &store)?;
    let report = FileReport::new(
        config
            .output_dir
            .join(session.report_file_name(&config.output_prefix)),
    );
    info!(
        "Session {} writing report to {}",
        session,
        report.path().display()
    );

    let reporter = CliReporter::new();
    let summary = ScanController::new(config, &backend, &store, &report, session)
        .with_resume(args.resume)
        .run(&args.directory, &reporter)?;

    Ok(summary)
}

/// An explicit `--session` wins; `--resume` alone picks the newest interrupted
/// session for this prefix; otherwise a fresh timestamped session starts.
fn resolve_session(args: &Cli, store: &dyn ProgressStore) -> Result<SessionId> {
    if let Some(id) = &args.session {
        return SessionId::parse(id)
            .with_context(|| format!("invalid session id '{}', expected YYYYMMDD-HHMMSS", id));
    }

    if args.resume {
        if let Some(latest) = store.latest_session()? {
            info!("Resuming most recent session {}", latest);
            return Ok(latest);
        }
        warn!("No interrupted session found, starting a new one");
    }

    Ok(SessionId::now())
}

fn print_summary(summary: &ScanSummary) {
    let stats = &summary.stats;
    let corrupted = format!("{}", stats.corrupted);

    println!();
    println!(
        "Checked {} files in {}",
        format!("{}", stats.processed).green(),
        format!("{:.2}s", summary.duration.as_secs_f64()).green(),
    );
    if stats.skipped > 0 {
        println!(
            "{} files skipped from session {}",
            format!("{}", stats.skipped).cyan(),
            summary.session,
        );
    }
    println!(
        "Corrupted files found: {}",
        if stats.corrupted > 0 {
            corrupted.red()
        } else {
            corrupted.green()
        }
    );
    println!(
        "Report saved to: {}",
        summary.report_path.display().to_string().cyan()
    );
}
