use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ExportError;
use crate::models::PersistedState;
use crate::storage::STORAGE_KEY;

pub const EXPORT_VERSION: &str = "1.0";

/// Persisted blob plus export metadata. Write-only: nothing reads it back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedProgress {
    #[serde(flatten)]
    pub state: PersistedState,
    pub export_date: DateTime<Utc>,
    pub version: &'static str,
}

impl ExportedProgress {
    pub fn new(state: PersistedState, export_date: DateTime<Utc>) -> Self {
        Self {
            state,
            export_date,
            version: EXPORT_VERSION,
        }
    }
}

pub fn file_name(export_date: DateTime<Utc>) -> String {
    format!("{}-{}.json", STORAGE_KEY, export_date.format("%Y%m%d-%H%M%S"))
}

pub fn write(dir: &Path, export: &ExportedProgress) -> Result<PathBuf, ExportError> {
    let path = dir.join(file_name(export.export_date));
    let contents = serde_json::to_string_pretty(export)?;

    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::write(&path, contents).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProgressState, StepId};
    use chrono::TimeZone;
    use serde_json::Value;

    fn export() -> ExportedProgress {
        let mut state = ProgressState::new("beginner");
        state.mark_completed(&StepId::Number(1));
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 5).unwrap();
        ExportedProgress::new(state.to_persisted(at), at)
    }

    #[test]
    fn file_name_is_timestamped() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 5).unwrap();
        assert_eq!(file_name(at), "ddd-learning-progress-20261016-083005.json");
    }

    #[test]
    fn serializes_blob_with_metadata() {
        let value = serde_json::to_value(export()).unwrap();
        assert_eq!(value["currentPath"], "beginner");
        assert_eq!(value["progress"]["completedSteps"][0], 1);
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["exportDate"], "2026-10-16T08:30:05Z");
        assert!(value.get("savedAt").is_some());
    }

    #[test]
    fn write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let path = write(&target, &export()).unwrap();

        assert_eq!(path.parent().unwrap(), target.as_path());
        let contents = std::fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["version"], "1.0");
    }
}
