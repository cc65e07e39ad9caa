//! Error types for collecting, planning and executing file operations.
//!
//! Each stage has its own error so callers can decide how to react:
//! - `WalkError`: traversal failed, the collected list is unusable
//! - `CopyError`: a copy failed, the batch stopped (already copied files stay)
//! - `DeleteError`: a single source could not be removed, the batch went on
//! - `ManifestError`: the manifest could not be written or read back
//! - `PlanError`: a source path could not be made absolute
//!
//! `AppError` wraps all of them for the command layer.

use crate::config::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while traversing the source tree.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Reading a directory or entry failed.
    #[error("Failed to traverse {}: {source}", path.display())]
    Traverse {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    /// The entry was listed but its metadata could not be read.
    #[error("Failed to read metadata of {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure while copying a single file. Aborts the batch.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CopyError {
    /// The file the failed step was working on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::CreateDir { path, .. } | Self::Read { path, .. } | Self::Write { path, .. } => {
                path
            }
        }
    }
}

/// Failure while removing a source file. Recorded, never fatal.
#[derive(Debug, Error)]
#[error("Failed to delete {}: {source}", path.display())]
pub struct DeleteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Failure while writing or reading an operation manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Failed to write manifest {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while turning collected entries into planned operations.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Failed to resolve absolute path of {}: {source}", path.display())]
    AbsolutePath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Every error a command can end with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Copy(#[from] CopyError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("Source directory does not exist: {}", .0.display())]
    MissingSource(PathBuf),
}
