//! Collection rules and TOML settings.
//!
//! `CollectConfig` is the immutable rule set the walker classifies entries
//! with. `Settings` is what users write on disk; it compiles into a
//! `CollectConfig` plus the planning knobs (cutoff, collision scope,
//! manifest naming).
//!
//! # Configuration File Format
//!
//! ```toml
//! [collect]
//! supported_extensions = [".png", ".jpeg", ".jpg", ".gif"]
//! excluded_dirs = ["Android/Data", ".thumbnails"]
//!
//! [plan]
//! cutoff_months = 2
//! cutoff_date = "2021-03-03"
//! collision_scope = "file-name"
//! manifest_prefix = "copy_desc_"
//! ```

use crate::namer::CollisionScope;
use chrono::{DateTime, Local, Months, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions collected when nothing else is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".png", ".jpeg", ".jpg", ".gif"];

/// Directory substrings pruned when nothing else is configured.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "Android/Data",
    ".thumbnails",
    "WhatsApp/.Shared",
    "WhatsApp/Media/.Statuses",
    "WhatsApp/.Thumbs",
];

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(#[from] std::io::Error),
    /// The cutoff date cannot be represented in local time.
    #[error("Invalid cutoff: {0}")]
    InvalidCutoff(String),
}

/// Rules deciding which entries the walker returns.
///
/// Excluded directory rules are lowercase substrings matched against the
/// whole path. Extensions are stored lowercase without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectConfig {
    excluded_dirs: Vec<String>,
    supported_extensions: HashSet<String>,
}

impl CollectConfig {
    /// Builds a rule set, normalizing case and leading dots.
    pub fn new<D, E>(excluded_dirs: D, supported_extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let excluded_dirs = excluded_dirs
            .into_iter()
            .map(|dir| dir.as_ref().to_lowercase())
            .filter(|dir| !dir.is_empty())
            .collect();
        let supported_extensions = supported_extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        Self {
            excluded_dirs,
            supported_extensions,
        }
    }

    pub fn excluded_dirs(&self) -> &[String] {
        &self.excluded_dirs
    }

    pub fn supported_extensions(&self) -> &HashSet<String> {
        &self.supported_extensions
    }
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_DIRS, DEFAULT_EXTENSIONS)
    }
}

/// Settings as stored in a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub collect: CollectSection,
    #[serde(default)]
    pub plan: PlanSection,
}

/// `[collect]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectSection {
    #[serde(default = "default_extensions")]
    pub supported_extensions: Vec<String>,
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
}

/// `[plan]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSection {
    /// Files older than this many months are moved instead of copied.
    #[serde(default = "default_cutoff_months")]
    pub cutoff_months: u32,
    /// Fixed cutoff, overrides `cutoff_months`.
    #[serde(default)]
    pub cutoff_date: Option<NaiveDate>,
    #[serde(default)]
    pub collision_scope: CollisionScope,
    #[serde(default = "default_manifest_prefix")]
    pub manifest_prefix: String,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_excluded_dirs() -> Vec<String> {
    DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
}

fn default_cutoff_months() -> u32 {
    2
}

fn default_manifest_prefix() -> String {
    "copy_desc_".to_string()
}

impl Default for CollectSection {
    fn default() -> Self {
        Self {
            supported_extensions: default_extensions(),
            excluded_dirs: default_excluded_dirs(),
        }
    }
}

impl Default for PlanSection {
    fn default() -> Self {
        Self {
            cutoff_months: default_cutoff_months(),
            cutoff_date: None,
            collision_scope: CollisionScope::default(),
            manifest_prefix: default_manifest_prefix(),
        }
    }
}

impl Settings {
    /// Load settings from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.mediabucketrc.toml` in the current directory
    /// 3. Look for `~/.config/mediabucket/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any discovered file is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".mediabucketrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("mediabucket")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compiles the `[collect]` table into classifier rules.
    pub fn collect_config(&self) -> CollectConfig {
        CollectConfig::new(
            &self.collect.excluded_dirs,
            &self.collect.supported_extensions,
        )
    }

    /// Resolves the move/copy cutoff relative to `now`.
    ///
    /// A fixed `cutoff_date` wins (local midnight); otherwise `cutoff_months`
    /// calendar months are subtracted, clamping the day to the month's end.
    pub fn cutoff(&self, now: DateTime<Local>) -> Result<DateTime<Local>, ConfigError> {
        if let Some(date) = self.plan.cutoff_date {
            return local_midnight(date).ok_or_else(|| {
                ConfigError::InvalidCutoff(format!("{} has no local midnight", date))
            });
        }

        months_before(now, self.plan.cutoff_months).ok_or_else(|| {
            ConfigError::InvalidCutoff(format!(
                "{} months before {} is out of range",
                self.plan.cutoff_months, now
            ))
        })
    }
}

/// Start of `date` in the local timezone.
pub fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    Local
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
}

/// `date` shifted back by whole calendar months.
pub fn months_before(date: DateTime<Local>, months: u32) -> Option<DateTime<Local>> {
    date.checked_sub_months(Months::new(months))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_default_settings_use_builtin_lists() {
        let settings = Settings::default();
        assert_eq!(settings.collect.supported_extensions.len(), 4);
        assert_eq!(settings.collect.excluded_dirs.len(), 5);
        assert_eq!(settings.plan.cutoff_months, 2);
        assert_eq!(settings.plan.collision_scope, CollisionScope::FileName);
        assert_eq!(settings.plan.manifest_prefix, "copy_desc_");
    }

    #[test]
    fn test_collect_config_normalizes_rules() {
        let config = CollectConfig::new(["WhatsApp/.Thumbs", ""], [".PNG", "jpg", "", "."]);

        assert_eq!(config.excluded_dirs(), &["whatsapp/.thumbs".to_string()]);
        assert_eq!(config.supported_extensions().len(), 2);
        assert!(config.supported_extensions().contains("png"));
        assert!(config.supported_extensions().contains("jpg"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            [collect]
            supported_extensions = ["heic"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.collect.supported_extensions, vec!["heic"]);
        assert_eq!(settings.collect.excluded_dirs.len(), 5);
        assert_eq!(settings.plan.cutoff_months, 2);
    }

    #[test]
    fn test_full_toml() {
        let settings = Settings::from_toml(
            r#"
            [collect]
            supported_extensions = [".png"]
            excluded_dirs = ["cache"]

            [plan]
            cutoff_months = 6
            cutoff_date = "2021-03-03"
            collision_scope = "bucket"
            manifest_prefix = "plan_"
            "#,
        )
        .unwrap();

        assert_eq!(settings.plan.cutoff_months, 6);
        assert_eq!(
            settings.plan.cutoff_date,
            NaiveDate::from_ymd_opt(2021, 3, 3)
        );
        assert_eq!(settings.plan.collision_scope, CollisionScope::Bucket);
        assert_eq!(settings.plan.manifest_prefix, "plan_");
        assert_eq!(settings.collect_config().excluded_dirs(), &["cache".to_string()]);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Settings::from_toml("[collect\nsupported_extensions = 3");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_unknown_collision_scope_is_rejected() {
        let result = Settings::from_toml("[plan]\ncollision_scope = \"everywhere\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = Settings::load(Some(Path::new("/non/existent/mediabucket.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_cutoff_from_fixed_date() {
        let mut settings = Settings::default();
        settings.plan.cutoff_date = NaiveDate::from_ymd_opt(2021, 3, 3);

        let cutoff = settings.cutoff(Local::now()).unwrap();
        assert_eq!(cutoff.date_naive(), NaiveDate::from_ymd_opt(2021, 3, 3).unwrap());
        assert_eq!(cutoff.time(), NaiveTime::MIN);
    }

    #[test]
    fn test_months_before() {
        let date = local_midnight(NaiveDate::from_ymd_opt(2021, 3, 3).unwrap()).unwrap();

        let one = months_before(date, 1).unwrap();
        let two = months_before(date, 2).unwrap();
        assert_eq!(one.month(), 2, "1 month in the past must be February");
        assert_eq!(two.month(), 1, "2 months in the past must be January");
    }

    #[test]
    fn test_months_before_changes_year() {
        let date = local_midnight(NaiveDate::from_ymd_opt(2021, 3, 3).unwrap()).unwrap();

        let three = months_before(date, 3).unwrap();
        let six = months_before(date, 6).unwrap();
        assert_eq!(three.month(), 12);
        assert_eq!(three.year(), 2020);
        assert_eq!(six.month(), 9);
        assert_eq!(six.year(), 2020);
    }
}
