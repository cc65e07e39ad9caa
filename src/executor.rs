//! Performs copies and deletions on disk.
//!
//! Copies are fail-fast: the first read, write or directory error stops the
//! batch and is returned. Files copied before the failure stay where they
//! are. Deletions are best-effort: a failed removal is logged and recorded in
//! the report, and the batch continues.
//!
//! A file whose destination is its own path is left untouched and listed in
//! [`ExecutionReport::in_place`]. It is never removed as a source.

use crate::error::{CopyError, DeleteError};
use crate::manifest::OperationManifest;
use crate::namer::{CollisionScope, CollisionState, absolute_path, compute_destination};
use crate::planner::OpType;
use crate::walker::FileEntry;
use chrono::{DateTime, Local};
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of an executor call.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Destination paths written, in order.
    pub copied: Vec<PathBuf>,
    /// Source paths removed, in order.
    pub deleted: Vec<PathBuf>,
    /// Removals that failed.
    pub delete_failures: Vec<DeleteError>,
    /// Sources that already sat at their destination.
    pub in_place: Vec<PathBuf>,
}

impl ExecutionReport {
    /// Returns true if no deletion failed.
    pub fn is_complete_success(&self) -> bool {
        self.delete_failures.is_empty()
    }

    /// The entries whose source differs from their destination.
    pub fn relocated(&self, entries: &[FileEntry]) -> Vec<FileEntry> {
        entries
            .iter()
            .filter(|entry| !self.in_place.contains(&entry.path))
            .cloned()
            .collect()
    }
}

/// Runs copy and delete batches, reporting progress on a progress bar.
pub struct Executor {
    progress: ProgressBar,
    scope: CollisionScope,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    /// An executor with a hidden progress bar.
    pub fn new() -> Self {
        Self {
            progress: ProgressBar::hidden(),
            scope: CollisionScope::default(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_collision_scope(mut self, scope: CollisionScope) -> Self {
        self.scope = scope;
        self
    }

    /// Copies every entry into its bucket under `target_root`.
    ///
    /// Destination names are computed with fresh collision state, so the
    /// result matches what [`crate::planner::plan`] would produce for the
    /// same entries. Existing destination files are overwritten.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mediabucket::config::CollectConfig;
    /// use mediabucket::executor::Executor;
    /// use mediabucket::walker::collect_files;
    /// use std::path::Path;
    ///
    /// let entries = collect_files("/sdcard/DCIM", &CollectConfig::default()).unwrap();
    /// match Executor::new().copy_all(&entries, Path::new("/backup/photos")) {
    ///     Ok(report) => println!("Copied {} files", report.copied.len()),
    ///     Err(e) => eprintln!("Copy stopped at {}: {}", e.path().display(), e),
    /// }
    /// ```
    pub fn copy_all(
        &self,
        entries: &[FileEntry],
        target_root: &Path,
    ) -> Result<ExecutionReport, CopyError> {
        let mut state = CollisionState::new(self.scope);
        state.protect_sources(entries);
        let mut report = ExecutionReport::default();
        self.start(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let destination = compute_destination(entry, target_root, &mut state);
            tracing::debug!(
                "Copying {}/{} {} -> {}",
                index + 1,
                entries.len(),
                entry.path.display(),
                destination.display()
            );
            self.progress.set_message(entry.path.display().to_string());

            if is_same_file(&entry.path, &destination) {
                tracing::debug!("{} is already in place", entry.path.display());
                report.in_place.push(entry.path.clone());
            } else {
                copy_file(&entry.path, &destination)?;
            }
            report.copied.push(destination);
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        Ok(report)
    }

    /// Removes every entry's source file, continuing past failures.
    pub fn delete_all(&self, entries: &[FileEntry]) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        self.start(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            tracing::debug!(
                "Removing {}/{} {}",
                index + 1,
                entries.len(),
                entry.path.display()
            );
            self.progress.set_message(entry.path.display().to_string());
            remove_source(&entry.path, &mut report);
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        report
    }

    /// Removes the entries created strictly before `cutoff`.
    ///
    /// Returns the selected entries (whether or not each removal succeeded)
    /// together with the deletion report. Entries dated exactly at the cutoff
    /// are kept.
    pub fn delete_created_before(
        &self,
        cutoff: DateTime<Local>,
        entries: &[FileEntry],
    ) -> (Vec<FileEntry>, ExecutionReport) {
        let selected: Vec<FileEntry> = entries
            .iter()
            .filter(|entry| entry.creation_date < cutoff)
            .cloned()
            .collect();
        tracing::info!(
            "{} of {} files are older than {}",
            selected.len(),
            entries.len(),
            cutoff.format("%Y-%m-%d %H:%M:%S")
        );

        let report = self.delete_all(&selected);
        (selected, report)
    }

    /// Replays a manifest: copies each `from` to `to`, then removes the
    /// source of `MOVE` operations.
    ///
    /// Copy failures stop the replay; removal failures are recorded.
    pub fn apply(&self, manifest: &OperationManifest) -> Result<ExecutionReport, CopyError> {
        let mut report = ExecutionReport::default();
        let total = manifest.operations.len();
        self.start(total);

        for (index, operation) in manifest.operations.iter().enumerate() {
            tracing::debug!(
                "{} {}/{} {} -> {}",
                operation.op_type.as_str(),
                index + 1,
                total,
                operation.from.display(),
                operation.to.display()
            );
            self.progress.set_message(operation.from.display().to_string());

            if is_same_file(&operation.from, &operation.to) {
                tracing::debug!("{} is already in place", operation.from.display());
                report.in_place.push(operation.from.clone());
            } else {
                copy_file(&operation.from, &operation.to)?;
                if operation.op_type == OpType::Move {
                    remove_source(&operation.from, &mut report);
                }
            }
            report.copied.push(operation.to.clone());
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        Ok(report)
    }

    fn start(&self, total: usize) {
        self.progress.set_length(total as u64);
        self.progress.set_position(0);
    }
}

fn is_same_file(source: &Path, destination: &Path) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(destination)) {
        (Ok(source), Ok(destination)) => source == destination,
        _ => absolute_path(source) == absolute_path(destination),
    }
}

/// Reads `source` fully and writes it to `destination`, creating parents.
/// The copy keeps the source's modification time.
fn copy_file(source: &Path, destination: &Path) -> Result<(), CopyError> {
    let read_error = |e| CopyError::Read {
        path: source.to_path_buf(),
        source: e,
    };
    let modified = fs::metadata(source)
        .and_then(|metadata| metadata.modified())
        .map_err(read_error)?;

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| CopyError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let bytes = fs::read(source).map_err(read_error)?;

    fs::write(destination, bytes)
        .and_then(|()| fs::File::options().write(true).open(destination))
        .and_then(|file| file.set_modified(modified))
        .map_err(|e| CopyError::Write {
            path: destination.to_path_buf(),
            source: e,
        })
}

fn remove_source(path: &Path, report: &mut ExecutionReport) {
    match fs::remove_file(path) {
        Ok(()) => report.deleted.push(path.to_path_buf()),
        Err(source) => {
            let error = DeleteError {
                path: path.to_path_buf(),
                source,
            };
            tracing::warn!("{}", error);
            report.delete_failures.push(error);
        }
    }
}
