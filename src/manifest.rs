//! JSON manifest of planned operations.
//!
//! The manifest is the dry-run artifact: it is written under the target
//! root and can be reviewed, then replayed with `Executor::apply`. Its shape
//! is fixed:
//!
//! ```json
//! { "operations": [ { "from": "/abs/src.jpg", "to": "/t/2021/August/src.jpg", "type": "MOVE" } ] }
//! ```

use crate::error::ManifestError;
use crate::planner::{OpType, PlannedOperation};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Ordered list of planned operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationManifest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<PlannedOperation>,
}

impl OperationManifest {
    pub fn new(operations: Vec<PlannedOperation>) -> Self {
        Self { operations }
    }

    /// Default manifest file name for a run started at `now`.
    ///
    /// Example: `copy_desc_2021-08-15-14-03-59.json`
    pub fn default_file_name(prefix: &str, now: DateTime<Local>) -> String {
        format!("{}{}.json", prefix, now.format("%Y-%m-%d-%H-%M-%S"))
    }

    /// Number of operations of the given kind.
    pub fn count(&self, op_type: OpType) -> usize {
        self.operations
            .iter()
            .filter(|op| op.op_type == op_type)
            .count()
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(ManifestError::Serialize)
    }

    /// Writes the manifest to `<target_root>/<file_name>`, replacing any
    /// existing file, and returns the written path.
    pub fn write(&self, target_root: &Path, file_name: &str) -> Result<PathBuf, ManifestError> {
        let path = target_root.join(file_name);
        let json = self.to_json()?;

        fs::create_dir_all(target_root).map_err(|source| ManifestError::Write {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| ManifestError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::info!("{} written", path.display());
        Ok(path)
    }

    /// Reads a manifest previously produced by [`OperationManifest::write`].
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;
    use tempfile::TempDir;

    fn sample() -> OperationManifest {
        OperationManifest::new(vec![
            PlannedOperation {
                from: PathBuf::from("/src/test.gif"),
                to: PathBuf::from("/target/2021/August/test.gif"),
                op_type: OpType::Move,
            },
            PlannedOperation {
                from: PathBuf::from("/src/sub/test.gif"),
                to: PathBuf::from("/target/2021/August/test_1.gif"),
                op_type: OpType::Copy,
            },
        ])
    }

    #[test]
    fn test_json_shape() {
        let json: Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();

        let ops = json["operations"].as_array().unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0]["from"], "/src/test.gif");
        assert_eq!(ops[0]["to"], "/target/2021/August/test.gif");
        assert_eq!(ops[0]["type"], "MOVE");
        assert_eq!(ops[1]["type"], "COPY");
        assert_eq!(ops[0].as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let empty = OperationManifest::default();
        assert_eq!(empty.to_json().unwrap(), "{}");

        let partial = OperationManifest::new(vec![PlannedOperation {
            from: PathBuf::new(),
            to: PathBuf::from("/t/x.png"),
            op_type: OpType::Copy,
        }]);
        let json: Value = serde_json::from_str(&partial.to_json().unwrap()).unwrap();
        assert!(json["operations"][0].get("from").is_none());
    }

    #[test]
    fn test_write_and_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let manifest = sample();

        let path = manifest.write(temp_dir.path(), "test_desc.json").unwrap();

        assert_eq!(path, temp_dir.path().join("test_desc.json"));
        assert!(path.is_file());
        assert_eq!(OperationManifest::load(&path).unwrap(), manifest);
    }

    #[test]
    fn test_write_overwrites_and_creates_target() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("not").join("yet");

        sample().write(&target, "desc.json").unwrap();
        let path = OperationManifest::default().write(&target, "desc.json").unwrap();

        assert_eq!(OperationManifest::load(&path).unwrap(), OperationManifest::default());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "{ \"operations\": [ { \"type\": \"RENAME\" } ] }").unwrap();

        assert!(matches!(
            OperationManifest::load(&path),
            Err(ManifestError::Parse { .. })
        ));
        assert!(matches!(
            OperationManifest::load(&temp_dir.path().join("missing.json")),
            Err(ManifestError::Read { .. })
        ));
    }

    #[test]
    fn test_default_file_name() {
        let now = Local.with_ymd_and_hms(2021, 8, 15, 14, 3, 59).unwrap();
        assert_eq!(
            OperationManifest::default_file_name("copy_desc_", now),
            "copy_desc_2021-08-15-14-03-59.json"
        );
    }

    #[test]
    fn test_count_by_type() {
        let manifest = sample();
        assert_eq!(manifest.count(OpType::Move), 1);
        assert_eq!(manifest.count(OpType::Copy), 1);
    }
}
