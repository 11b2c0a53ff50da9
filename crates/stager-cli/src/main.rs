//! Stager - asset staging for platform builds
//!
//! Usage:
//!   stager android -textures -audio android/assets    # Stage a partial Android payload
//!   stager cmake build/cmake/ba_root                  # Stage a desktop build tree
//!   stager win-x64 Release build/windows/x64/Release  # Stage with Windows extras
//!   stager --dry-run xcode-mac                        # Report what would change

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use stager_core::prelude::*;

#[derive(Parser)]
#[command(name = "stager")]
#[command(about = "Stage build assets into platform destination trees", long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    project_root: Option<PathBuf>,

    /// Extra config file, applied over the global and project files
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Worker threads for copy, compare and hash work
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Report what would change without touching the destination
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short = 'o', long, default_value = "table")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Platform selector (android, cmake, win-x64, xcode-ios, ...)
    #[arg(allow_hyphen_values = true)]
    selector: String,

    /// Sub-flags and destination arguments for the selected platform
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable summary
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// No output on success
    Quiet,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "stager=debug,warn"
    } else {
        "stager=info,warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let report = match run(&cli) {
        Ok(report) => report,
        Err(err) => {
            if matches!(cli.format, OutputFormat::Json) {
                print_json_error(&err)?;
            }
            return Err(err.context(format!("staging for '{}' failed", cli.selector)));
        }
    };
    match cli.format {
        OutputFormat::Table => print_table(&report),
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Quiet => {}
    }

    Ok(())
}

fn run(cli: &Cli) -> Result<StageReport> {
    let project_root = match &cli.project_root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    let mut store = ConfigStore::from_project(&project_root);
    if let Some(path) = &cli.config {
        store = store.with_explicit(path);
    }
    let config = store.load()?;
    debug!(?config, project_root = %project_root.display(), "configuration loaded");

    let jobs = cli.jobs.or(config.jobs);
    let context = StageContext::from_process_env(project_root, config);
    let profile = resolve(&cli.selector, &cli.args, &context)?;
    debug!(?profile, "resolved platform profile");

    let workers = Workers::new(jobs, CancelFlag::new())?;
    let options = StageOptions {
        dry_run: cli.dry_run,
    };
    Ok(stage(&profile, &workers, &options)?)
}

fn print_table(report: &StageReport) {
    let suffix = if report.dry_run { " (dry run)" } else { "" };
    println!(
        "Staged {} -> {}{}",
        report.platform,
        report.destination.display(),
        suffix
    );
    println!("Categories: {}", report.categories);
    println!();

    println!(
        "  {:<8} {:>7} {:>7} {:>9} {:>7} {:>7}",
        "Pass", "Added", "Updated", "Unchanged", "Deleted", "Pruned"
    );
    println!("  {}", "-".repeat(51));
    if let Some(extras) = &report.extras {
        print_pass_row("extras", extras);
    }
    print_pass_row("assets", &report.assets);
    println!();

    match &report.manifest {
        Some(manifest) if manifest.written => println!(
            "Manifest: {} ({} entries, {})",
            manifest.path.display(),
            manifest.entries,
            if manifest.is_full { "full" } else { "partial" }
        ),
        Some(_) => println!("Manifest: none (no payload files)"),
        None => {}
    }

    let total = report.total();
    if total.skipped > 0 {
        println!("Skipped {} excluded source files", total.skipped);
    }
    println!("Summary: {} changes", total.changes());
}

fn print_pass_row(name: &str, pass: &SyncReport) {
    println!(
        "  {:<8} {:>7} {:>7} {:>9} {:>7} {:>7}",
        name, pass.added, pass.updated, pass.unchanged, pass.deleted, pass.dirs_pruned
    );
}

fn print_json(report: &StageReport) -> Result<()> {
    let output = serde_json::json!({
        "report": report,
        "changes": report.total().changes(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_json_error(err: &anyhow::Error) -> Result<()> {
    let kind = err
        .downcast_ref::<StageError>()
        .map(StageError::kind)
        .unwrap_or("internal");
    let output = serde_json::json!({
        "error": {
            "kind": kind,
            "message": err.to_string(),
        }
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
