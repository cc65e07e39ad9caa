//! Command orchestration for mediabucket.
//!
//! This module wires the engine together for each command:
//! - `Plan`: collect, plan and write a manifest without touching sources
//! - `Copy`: collect and copy into year/month buckets
//! - `CopyDelete`: copy, then remove sources older than the cutoff
//! - `Apply`: replay a previously written manifest

use crate::config::Settings;
use crate::error::AppError;
use crate::executor::{ExecutionReport, Executor};
use crate::manifest::OperationManifest;
use crate::namer::CollisionState;
use crate::output::OutputFormatter;
use crate::planner::{OpType, plan_with_state};
use crate::walker::{FileEntry, collect_files};
use chrono::Local;
use std::path::{Path, PathBuf};

/// A command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCommand {
    /// Write a manifest describing what a copy would do.
    Plan {
        source: PathBuf,
        target: PathBuf,
        /// Overrides the timestamped default file name.
        manifest_name: Option<String>,
    },
    /// Copy every collected file into the target buckets.
    Copy { source: PathBuf, target: PathBuf },
    /// Copy, then delete sources created before the cutoff.
    CopyDelete { source: PathBuf, target: PathBuf },
    /// Replay a manifest.
    Apply { manifest: PathBuf },
}

/// What a command did, for the caller to report.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Files planned, copied or replayed.
    pub processed: usize,
    /// Source files removed.
    pub deleted: usize,
    /// Source files that could not be removed.
    pub delete_failures: usize,
    /// Manifest written by `Plan`.
    pub manifest_path: Option<PathBuf>,
}

/// Runs a command with settings discovered from the default locations.
///
/// # Examples
///
/// ```no_run
/// use mediabucket::cli::{run_cli, MediaCommand};
///
/// let command = MediaCommand::Copy {
///     source: "/sdcard/DCIM".into(),
///     target: "/backup/photos".into(),
/// };
/// match run_cli(&command) {
///     Ok(summary) => println!("Copied {} files", summary.processed),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(command: &MediaCommand) -> Result<RunSummary, AppError> {
    run_cli_with_config(command, None)
}

/// Runs a command with an optional configuration file.
pub fn run_cli_with_config(
    command: &MediaCommand,
    config_path: Option<&Path>,
) -> Result<RunSummary, AppError> {
    let settings = Settings::load(config_path)?;
    run_cli_with_settings(command, &settings)
}

/// Runs a command with already loaded settings.
pub fn run_cli_with_settings(
    command: &MediaCommand,
    settings: &Settings,
) -> Result<RunSummary, AppError> {
    match command {
        MediaCommand::Plan {
            source,
            target,
            manifest_name,
        } => plan_copy(source, target, manifest_name.as_deref(), settings),
        MediaCommand::Copy { source, target } => copy_files(source, target, settings),
        MediaCommand::CopyDelete { source, target } => {
            copy_and_delete_old(source, target, settings)
        }
        MediaCommand::Apply { manifest } => apply_manifest(manifest),
    }
}

/// Collects the files under `source` using the configured rules.
fn collect(source: &Path, settings: &Settings) -> Result<Vec<FileEntry>, AppError> {
    if !source.exists() {
        return Err(AppError::MissingSource(source.to_path_buf()));
    }

    OutputFormatter::info(&format!("Collecting images in: {}", source.display()));
    let entries = collect_files(source, &settings.collect_config())?;
    tracing::info!("Collected {} files from {}", entries.len(), source.display());
    Ok(entries)
}

fn executor(total: usize, settings: &Settings) -> Executor {
    Executor::new()
        .with_progress(OutputFormatter::create_progress_bar(total as u64))
        .with_collision_scope(settings.plan.collision_scope)
}

/// Writes a manifest describing the copy without changing any file.
fn plan_copy(
    source: &Path,
    target: &Path,
    manifest_name: Option<&str>,
    settings: &Settings,
) -> Result<RunSummary, AppError> {
    let entries = collect(source, settings)?;
    let now = Local::now();
    let cutoff = settings.cutoff(now)?;

    let mut state = CollisionState::new(settings.plan.collision_scope);
    let manifest = OperationManifest::new(plan_with_state(&entries, target, cutoff, &mut state)?);

    let file_name = manifest_name
        .map(str::to_string)
        .unwrap_or_else(|| OperationManifest::default_file_name(&settings.plan.manifest_prefix, now));
    let manifest_path = manifest.write(target, &file_name)?;

    if manifest.operations.is_empty() {
        OutputFormatter::warning("No files found to copy.");
    } else {
        let counts = OutputFormatter::bucket_counts(&manifest, target);
        OutputFormatter::summary_table(&counts, manifest.operations.len());
        OutputFormatter::plain(&format!(
            "{} to move (older than {}), {} to copy",
            manifest.count(OpType::Move),
            cutoff.format("%Y-%m-%d"),
            manifest.count(OpType::Copy)
        ));
    }
    OutputFormatter::dry_run_notice(&format!(
        "Manifest written to {}. No files were modified.",
        manifest_path.display()
    ));

    Ok(RunSummary {
        processed: manifest.operations.len(),
        manifest_path: Some(manifest_path),
        ..RunSummary::default()
    })
}

fn copy_files(source: &Path, target: &Path, settings: &Settings) -> Result<RunSummary, AppError> {
    let entries = collect(source, settings)?;
    OutputFormatter::plain(&format!("Number of files to copy: {}", entries.len()));

    let report = executor(entries.len(), settings).copy_all(&entries, target)?;
    OutputFormatter::success(&format!("Copied all files: {}", report.copied.len()));

    Ok(RunSummary {
        processed: report.copied.len(),
        ..RunSummary::default()
    })
}

fn copy_and_delete_old(
    source: &Path,
    target: &Path,
    settings: &Settings,
) -> Result<RunSummary, AppError> {
    let entries = collect(source, settings)?;
    let cutoff = settings.cutoff(Local::now())?;
    OutputFormatter::plain(&format!("Number of files to copy: {}", entries.len()));

    let copied = executor(entries.len(), settings).copy_all(&entries, target)?;
    OutputFormatter::success(&format!("Copied all files: {}", copied.copied.len()));

    // Files copied onto themselves are the only copy left
    let relocated = copied.relocated(&entries);
    let old = relocated.iter().filter(|e| e.creation_date < cutoff).count();
    let (_, deletion) = executor(old, settings).delete_created_before(cutoff, &relocated);
    report_deletions(&deletion);

    Ok(RunSummary {
        processed: copied.copied.len(),
        deleted: deletion.deleted.len(),
        delete_failures: deletion.delete_failures.len(),
        manifest_path: None,
    })
}

fn apply_manifest(manifest_path: &Path) -> Result<RunSummary, AppError> {
    OutputFormatter::info(&format!("Replaying manifest: {}", manifest_path.display()));
    let manifest = OperationManifest::load(manifest_path)?;

    let progress = OutputFormatter::create_progress_bar(manifest.operations.len() as u64);
    let report = Executor::new().with_progress(progress).apply(&manifest)?;
    OutputFormatter::success(&format!("Copied all files: {}", report.copied.len()));
    report_deletions(&report);

    Ok(RunSummary {
        processed: report.copied.len(),
        deleted: report.deleted.len(),
        delete_failures: report.delete_failures.len(),
        manifest_path: None,
    })
}

fn report_deletions(report: &ExecutionReport) {
    OutputFormatter::plain(&format!("Deleted files: {}", report.deleted.len()));
    if !report.is_complete_success() {
        OutputFormatter::warning(&format!(
            "{} files could not be deleted:",
            report.delete_failures.len()
        ));
        for failure in &report.delete_failures {
            OutputFormatter::error(&failure.to_string());
        }
    }
}
