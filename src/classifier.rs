//! Include/exclude decisions for single filesystem entries.
//!
//! Directory exclusion is a case-insensitive substring test on the whole
//! path, not a path-segment match: the rule `sub` also prunes
//! `photos/substring/`. File inclusion is an extension allow-list.

use crate::config::CollectConfig;
use std::path::Path;

/// What the walker should do with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// File with a supported extension, emit it.
    Include,
    /// File that is not collected.
    Ignore,
    /// Directory to walk into.
    Descend,
    /// Directory matching an exclusion rule; skip it and everything below it.
    Prune,
}

/// Classifies an entry against the collection rules.
///
/// # Examples
///
/// ```
/// use mediabucket::classifier::{classify, Classification};
/// use mediabucket::config::CollectConfig;
/// use std::path::Path;
///
/// let config = CollectConfig::new([".thumbnails"], [".jpg"]);
/// assert_eq!(classify(Path::new("DCIM/.Thumbnails"), true, &config), Classification::Prune);
/// assert_eq!(classify(Path::new("DCIM/IMG_01.JPG"), false, &config), Classification::Include);
/// ```
pub fn classify(path: &Path, is_dir: bool, config: &CollectConfig) -> Classification {
    if is_dir {
        if is_excluded_dir(path, config) {
            Classification::Prune
        } else {
            Classification::Descend
        }
    } else if has_supported_extension(path, config) {
        Classification::Include
    } else {
        Classification::Ignore
    }
}

/// True when the lowercase path contains any excluded-dir substring.
pub fn is_excluded_dir(path: &Path, config: &CollectConfig) -> bool {
    let lowered = path.to_string_lossy().to_lowercase();
    config
        .excluded_dirs()
        .iter()
        .any(|excluded| lowered.contains(excluded.as_str()))
}

/// True when the lowercase extension is in the allow-list.
pub fn has_supported_extension(path: &Path, config: &CollectConfig) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| config.supported_extensions().contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CollectConfig {
        CollectConfig::new(["Android/Data", "subdir/subsubdir"], [".png", ".jpg", ".jpeg", ".gif"])
    }

    #[test]
    fn test_supported_extension_is_included() {
        let config = config();
        assert_eq!(
            classify(Path::new("photos/a.png"), false, &config),
            Classification::Include
        );
        assert_eq!(
            classify(Path::new("photos/a.JPeG"), false, &config),
            Classification::Include
        );
    }

    #[test]
    fn test_unsupported_extension_is_ignored() {
        let config = config();
        assert_eq!(
            classify(Path::new("notes.txt"), false, &config),
            Classification::Ignore
        );
        assert_eq!(
            classify(Path::new("README"), false, &config),
            Classification::Ignore
        );
        // Only the last extension counts
        assert_eq!(
            classify(Path::new("a.png.bak"), false, &config),
            Classification::Ignore
        );
    }

    #[test]
    fn test_directory_is_never_included() {
        let config = config();
        assert_eq!(
            classify(Path::new("album.png"), true, &config),
            Classification::Descend
        );
    }

    #[test]
    fn test_excluded_dir_is_pruned_case_insensitive() {
        let config = config();
        assert_eq!(
            classify(Path::new("/sdcard/ANDROID/data"), true, &config),
            Classification::Prune
        );
        assert_eq!(
            classify(Path::new("/sdcard/Android/Data/com.app/cache"), true, &config),
            Classification::Prune
        );
        assert_eq!(
            classify(Path::new("/sdcard/Android"), true, &config),
            Classification::Descend
        );
    }

    #[test]
    fn test_exclusion_is_substring_not_segment() {
        let config = CollectConfig::new(["sub"], ["png"]);
        assert_eq!(
            classify(Path::new("photos/substring"), true, &config),
            Classification::Prune
        );
    }

    #[test]
    fn test_exclusion_does_not_apply_to_files() {
        let config = CollectConfig::new(["thumb"], ["png"]);
        assert_eq!(
            classify(Path::new("thumb.png"), false, &config),
            Classification::Include
        );
    }

    #[test]
    fn test_empty_rules() {
        let config = CollectConfig::new(Vec::<String>::new(), Vec::<String>::new());
        assert_eq!(
            classify(Path::new("a.png"), false, &config),
            Classification::Ignore
        );
        assert_eq!(classify(Path::new("a"), true, &config), Classification::Descend);
    }
}
