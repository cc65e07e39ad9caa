//! Destination paths for collected files.
//!
//! Every file goes to `<target>/<year>/<MonthName>/<file name>`. Files sharing
//! a base name get `_1`, `_2`, ... inserted before the extension, in the order
//! they are seen. By default the counter is keyed on the base name alone, so
//! `a/test.gif` (August) and `b/test.gif` (May) still become `test.gif` and
//! `test_1.gif` even though they land in different folders.
//! [`CollisionScope::Bucket`] keys on the destination folder as well.
//!
//! When the target tree overlaps the source tree, a destination is never
//! another collected file's source path. A file may keep its own path.

use crate::walker::FileEntry;
use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// What the collision counter is keyed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionScope {
    /// Base file name only, regardless of bucket.
    #[default]
    FileName,
    /// Bucket directory plus base file name.
    Bucket,
}

/// Per-pass naming state. Create one per planning or copy run.
#[derive(Debug, Default)]
pub struct CollisionState {
    scope: CollisionScope,
    counters: HashMap<PathBuf, u32>,
    issued: HashSet<PathBuf>,
    /// Absolute source paths that no other entry may be written over.
    protected: HashSet<PathBuf>,
}

impl CollisionState {
    pub fn new(scope: CollisionScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Marks the sources of `entries` as paths no other entry may take.
    pub fn protect_sources(&mut self, entries: &[FileEntry]) {
        self.protected
            .extend(entries.iter().map(|entry| absolute_path(&entry.path)));
    }

    fn is_taken(&self, destination: &Path, own_source: &Path) -> bool {
        if self.issued.contains(destination) {
            return true;
        }
        if self.protected.is_empty() {
            return false;
        }
        let destination = absolute_path(destination);
        destination != own_source && self.protected.contains(&destination)
    }

    /// Reserves a unique file name inside `bucket` for the file at `own_source`.
    fn reserve(&mut self, bucket: &Path, file_name: &OsStr, own_source: &Path) -> PathBuf {
        let key = match self.scope {
            CollisionScope::FileName => PathBuf::from(file_name),
            CollisionScope::Bucket => bucket.join(file_name),
        };

        // Already sorted files stay where they are
        let unsuffixed = bucket.join(file_name);
        if !self.issued.contains(&unsuffixed) && absolute_path(&unsuffixed) == own_source {
            self.counters.entry(key).or_insert(0);
            self.issued.insert(unsuffixed.clone());
            return unsuffixed;
        }

        let mut counter = self.counters.get(&key).map(|n| n + 1);
        loop {
            let destination = match counter {
                None => bucket.join(file_name),
                Some(n) => bucket.join(suffixed_name(file_name, n)),
            };
            // A literal "test_1.gif" in the source can collide with a generated name
            if !self.is_taken(&destination, own_source) {
                self.counters.insert(key, counter.unwrap_or(0));
                self.issued.insert(destination.clone());
                return destination;
            }
            counter = Some(counter.map_or(1, |n| n + 1));
        }
    }
}

/// `path` made absolute against the current directory, unchanged if that fails.
///
/// Purely lexical: symlinks and `..` components are not resolved.
pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// `<target_root>/<year>/<full English month name>`.
pub fn bucket_dir(target_root: &Path, date: &DateTime<Local>) -> PathBuf {
    target_root
        .join(date.year().to_string())
        .join(date.format("%B").to_string())
}

/// Inserts `_<counter>` before the last extension of `file_name`.
///
/// ```
/// use mediabucket::namer::suffixed_name;
/// use std::ffi::OsStr;
///
/// assert_eq!(suffixed_name(OsStr::new("test.gif"), 2), "test_2.gif");
/// assert_eq!(suffixed_name(OsStr::new("a.tar.gz"), 1), "a.tar_1.gz");
/// assert_eq!(suffixed_name(OsStr::new("README"), 1), "README_1");
/// ```
pub fn suffixed_name(file_name: &OsStr, counter: u32) -> OsString {
    let path = Path::new(file_name);
    let stem = path.file_stem().unwrap_or(file_name);

    let mut name = OsString::from(stem);
    name.push(format!("_{}", counter));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

/// Computes where `entry` goes under `target_root`, updating `state`.
pub fn compute_destination(
    entry: &FileEntry,
    target_root: &Path,
    state: &mut CollisionState,
) -> PathBuf {
    let bucket = bucket_dir(target_root, &entry.creation_date);
    let file_name = entry
        .path
        .file_name()
        .unwrap_or_else(|| entry.path.as_os_str());
    let own_source = absolute_path(&entry.path);
    state.reserve(&bucket, file_name, &own_source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(path: &str, year: i32, month: u32) -> FileEntry {
        FileEntry::new(
            path,
            Local.with_ymd_and_hms(year, month, 10, 12, 0, 0).unwrap(),
        )
    }

    fn names(destinations: &[PathBuf]) -> Vec<String> {
        destinations
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_bucket_uses_year_and_month_name() {
        let target = Path::new("/target");
        let mut state = CollisionState::default();

        let destination = compute_destination(&entry("/src/a.png", 2021, 8), target, &mut state);
        assert_eq!(destination, Path::new("/target/2021/August/a.png"));

        let destination = compute_destination(&entry("/src/b.png", 1999, 12), target, &mut state);
        assert_eq!(destination, Path::new("/target/1999/December/b.png"));
    }

    #[test]
    fn test_collisions_get_incrementing_suffix() {
        let target = Path::new("/target");
        let mut state = CollisionState::default();

        let destinations: Vec<PathBuf> = ["/a/test.gif", "/b/test.gif", "/c/test.gif", "/a/x.gif"]
            .iter()
            .map(|p| compute_destination(&entry(p, 2021, 8), target, &mut state))
            .collect();

        assert_eq!(
            names(&destinations),
            vec!["test.gif", "test_1.gif", "test_2.gif", "x.gif"]
        );
    }

    #[test]
    fn test_file_name_scope_ignores_bucket() {
        let target = Path::new("/target");
        let mut state = CollisionState::new(CollisionScope::FileName);

        let first = compute_destination(&entry("/a/test.gif", 2021, 8), target, &mut state);
        let second = compute_destination(&entry("/b/test.gif", 2020, 5), target, &mut state);

        assert_eq!(first, Path::new("/target/2021/August/test.gif"));
        assert_eq!(second, Path::new("/target/2020/May/test_1.gif"));
    }

    #[test]
    fn test_bucket_scope_only_renames_real_collisions() {
        let target = Path::new("/target");
        let mut state = CollisionState::new(CollisionScope::Bucket);

        let first = compute_destination(&entry("/a/test.gif", 2021, 8), target, &mut state);
        let second = compute_destination(&entry("/b/test.gif", 2020, 5), target, &mut state);
        let third = compute_destination(&entry("/c/test.gif", 2021, 8), target, &mut state);

        assert_eq!(first, Path::new("/target/2021/August/test.gif"));
        assert_eq!(second, Path::new("/target/2020/May/test.gif"));
        assert_eq!(third, Path::new("/target/2021/August/test_1.gif"));
    }

    #[test]
    fn test_literal_suffixed_name_does_not_clash() {
        let target = Path::new("/target");
        let mut state = CollisionState::default();

        let destinations: Vec<PathBuf> = ["/a/test.gif", "/a/test_1.gif", "/b/test.gif"]
            .iter()
            .map(|p| compute_destination(&entry(p, 2021, 8), target, &mut state))
            .collect();

        assert_eq!(
            names(&destinations),
            vec!["test.gif", "test_1.gif", "test_2.gif"]
        );
    }

    #[test]
    fn test_state_is_per_pass() {
        let target = Path::new("/target");

        let mut first_pass = CollisionState::default();
        compute_destination(&entry("/a/test.gif", 2021, 8), target, &mut first_pass);

        let mut second_pass = CollisionState::default();
        let destination =
            compute_destination(&entry("/a/test.gif", 2021, 8), target, &mut second_pass);
        assert_eq!(destination, Path::new("/target/2021/August/test.gif"));
    }

    #[test]
    fn test_protected_source_is_not_overwritten() {
        let target = Path::new("/lib");
        let moved = entry("/lib/2020/January/x.png", 2021, 8);
        let resident = entry("/lib/2021/August/x.png", 2021, 8);
        let mut state = CollisionState::new(CollisionScope::Bucket);
        state.protect_sources(&[moved.clone(), resident.clone()]);

        let first = compute_destination(&moved, target, &mut state);
        let second = compute_destination(&resident, target, &mut state);

        assert_eq!(first, Path::new("/lib/2021/August/x_1.png"));
        assert_eq!(second, Path::new("/lib/2021/August/x.png"));
    }

    #[test]
    fn test_file_may_keep_its_own_path() {
        let target = Path::new("/lib");
        let sorted = entry("/lib/2021/August/x.png", 2021, 8);
        let mut state = CollisionState::default();
        state.protect_sources(std::slice::from_ref(&sorted));

        let destination = compute_destination(&sorted, target, &mut state);
        assert_eq!(destination, sorted.path);
    }

    #[test]
    fn test_suffix_without_extension_and_dotfile() {
        assert_eq!(suffixed_name(OsStr::new("README"), 3), "README_3");
        assert_eq!(suffixed_name(OsStr::new(".hidden.png"), 1), ".hidden_1.png");
    }
}
