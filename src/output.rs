//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and the per-bucket plan summary.

use crate::manifest::OperationManifest;
use crate::planner::OpType;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::Path;

/// Move and copy counts for one bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BucketCount {
    pub moves: usize,
    pub copies: usize,
}

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediabucket::output::OutputFormatter;
    /// OutputFormatter::success("Copied all files: 12");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for `total` file operations.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediabucket::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_with_message("Completed!");
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Groups a manifest's operations by bucket (`<year>/<month>` relative
    /// to `target_root`).
    pub fn bucket_counts(
        manifest: &OperationManifest,
        target_root: &Path,
    ) -> BTreeMap<String, BucketCount> {
        let mut counts: BTreeMap<String, BucketCount> = BTreeMap::new();
        for op in &manifest.operations {
            let bucket = op
                .to
                .parent()
                .map(|parent| parent.strip_prefix(target_root).unwrap_or(parent))
                .map(|bucket| bucket.display().to_string())
                .unwrap_or_default();
            let count = counts.entry(bucket).or_default();
            match op.op_type {
                OpType::Move => count.moves += 1,
                OpType::Copy => count.copies += 1,
            }
        }
        counts
    }

    /// Prints a summary table with move/copy counts per bucket.
    pub fn summary_table(bucket_counts: &BTreeMap<String, BucketCount>, total_files: usize) {
        Self::header("SUMMARY");

        let max_bucket_len = bucket_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(6); // At least "Bucket" width

        println!(
            "{:<width$} | {:>5} | {:>5}",
            "Bucket".bold(),
            "Move".bold(),
            "Copy".bold(),
            width = max_bucket_len
        );
        println!("{}", "-".repeat(max_bucket_len + 16));

        for (bucket, count) in bucket_counts {
            println!(
                "{:<width$} | {:>5} | {:>5}",
                bucket,
                count.moves.to_string().yellow(),
                count.copies.to_string().green(),
                width = max_bucket_len
            );
        }

        println!("{}", "-".repeat(max_bucket_len + 16));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            if total_files == 1 { "file" } else { "files" },
            width = max_bucket_len
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
