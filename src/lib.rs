//! mediabucket - sort images into year/month folders
//!
//! This library collects image files from a directory tree, computes a
//! `<target>/<year>/<MonthName>/` destination for each with conflict-safe
//! renaming, decides between move and copy by file age, and either executes
//! the copies or records them in a JSON manifest for review.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod manifest;
pub mod namer;
pub mod output;
pub mod planner;
pub mod walker;

pub use classifier::{Classification, classify};
pub use config::{CollectConfig, ConfigError, Settings};
pub use error::{AppError, CopyError, DeleteError, ManifestError, PlanError, WalkError};
pub use executor::{ExecutionReport, Executor};
pub use manifest::OperationManifest;
pub use namer::{CollisionScope, CollisionState, compute_destination};
pub use planner::{OpType, PlannedOperation, operation_type, plan, plan_with_state};
pub use walker::{FileEntry, collect_files, walk};

pub use cli::{MediaCommand, RunSummary, run_cli, run_cli_with_config, run_cli_with_settings};
