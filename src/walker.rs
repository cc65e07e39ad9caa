//! Recursive collection of media files.
//!
//! The walk is depth-first with entries sorted by file name inside each
//! directory, so repeated walks over an unchanged tree return the same
//! sequence. Excluded directories are pruned before descending. The first
//! filesystem error ends the walk.

use crate::classifier::{Classification, classify};
use crate::config::CollectConfig;
use crate::error::WalkError;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A collected file and the date used to bucket it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path as found under the walk root.
    pub path: PathBuf,
    /// Modification time of the file, in local time.
    pub creation_date: DateTime<Local>,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, creation_date: DateTime<Local>) -> Self {
        Self {
            path: path.into(),
            creation_date,
        }
    }
}

/// Lazy iterator over the files under a root. See [`walk`].
pub struct Walk<'a> {
    root: PathBuf,
    inner: walkdir::IntoIter,
    config: &'a CollectConfig,
    failed: bool,
}

/// Starts a walk over `root`.
///
/// Yields `Ok(FileEntry)` for every included file. After the first `Err`
/// the iterator is exhausted.
pub fn walk<'a>(root: impl AsRef<Path>, config: &'a CollectConfig) -> Walk<'a> {
    let root = root.as_ref().to_path_buf();
    let inner = WalkDir::new(&root).sort_by_file_name().into_iter();
    Walk {
        root,
        inner,
        config,
        failed: false,
    }
}

/// Walks `root` and materializes every entry, failing on the first error.
pub fn collect_files(
    root: impl AsRef<Path>,
    config: &CollectConfig,
) -> Result<Vec<FileEntry>, WalkError> {
    walk(root, config).collect()
}

impl Walk<'_> {
    fn fail(&mut self, error: WalkError) -> Option<Result<FileEntry, WalkError>> {
        self.failed = true;
        Some(Err(error))
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<FileEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    return self.fail(WalkError::Traverse { path, source: e });
                }
            };

            if entry.path_is_symlink() {
                continue;
            }

            match classify(entry.path(), entry.file_type().is_dir(), self.config) {
                Classification::Prune => {
                    tracing::debug!("Pruning excluded directory {}", entry.path().display());
                    self.inner.skip_current_dir();
                }
                Classification::Descend | Classification::Ignore => {}
                Classification::Include => {
                    let modified = match entry.metadata() {
                        Ok(metadata) => metadata.modified(),
                        Err(e) => {
                            let path = entry.path().to_path_buf();
                            let source = e.into_io_error().unwrap_or_else(|| {
                                std::io::Error::other("metadata unavailable")
                            });
                            return self.fail(WalkError::Metadata { path, source });
                        }
                    };
                    let modified = match modified {
                        Ok(time) => time,
                        Err(source) => {
                            let path = entry.path().to_path_buf();
                            return self.fail(WalkError::Metadata { path, source });
                        }
                    };

                    return Some(Ok(FileEntry::new(entry.into_path(), modified.into())));
                }
            }
        }
    }
}
