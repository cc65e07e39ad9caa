//! Turns collected entries into an ordered list of planned operations.
//!
//! Planning touches nothing on disk. Files strictly older than the cutoff are
//! planned as moves, everything else as copies.

use crate::error::PlanError;
use crate::namer::{CollisionState, compute_destination};
use crate::walker::FileEntry;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of a planned operation, serialized as `"MOVE"` / `"COPY"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpType {
    Move,
    Copy,
}

impl OpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpType::Move => "MOVE",
            OpType::Copy => "COPY",
        }
    }
}

/// A single source → destination operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedOperation {
    #[serde(default, skip_serializing_if = "is_empty_path")]
    pub from: PathBuf,
    #[serde(default, skip_serializing_if = "is_empty_path")]
    pub to: PathBuf,
    #[serde(rename = "type")]
    pub op_type: OpType,
}

fn is_empty_path(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

/// `Move` iff `creation_date < cutoff`. Equal to the cutoff is a copy.
pub fn operation_type(creation_date: &DateTime<Local>, cutoff: &DateTime<Local>) -> OpType {
    if creation_date < cutoff {
        OpType::Move
    } else {
        OpType::Copy
    }
}

/// Plans one operation per entry, in input order, with fresh naming state.
pub fn plan(
    entries: &[FileEntry],
    target_root: &Path,
    cutoff: DateTime<Local>,
) -> Result<Vec<PlannedOperation>, PlanError> {
    plan_with_state(entries, target_root, cutoff, &mut CollisionState::default())
}

/// Like [`plan`], but with caller-owned naming state (e.g. a non-default
/// collision scope).
pub fn plan_with_state(
    entries: &[FileEntry],
    target_root: &Path,
    cutoff: DateTime<Local>,
    state: &mut CollisionState,
) -> Result<Vec<PlannedOperation>, PlanError> {
    state.protect_sources(entries);
    entries
        .iter()
        .map(|entry| {
            let from =
                std::path::absolute(&entry.path).map_err(|source| PlanError::AbsolutePath {
                    path: entry.path.clone(),
                    source,
                })?;
            let to = compute_destination(entry, target_root, state);
            let op_type = operation_type(&entry.creation_date, &cutoff);
            tracing::debug!("Planned {} {} -> {}", op_type.as_str(), from.display(), to.display());

            Ok(PlannedOperation { from, to, op_type })
        })
        .collect()
}
