use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use super::{TaskRecord, TaskSource};
use crate::error::{TimelineError, TimelineResult};
use crate::model::{EntityId, TimelineEntity};

/// Reads `<dir>/<project id>.json`, each holding an array of task records.
/// A project without a file simply has no tasks.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_for(&self, project_id: &EntityId) -> TimelineResult<PathBuf> {
        let id = project_id.as_str();
        if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(TimelineError::InvalidInput(format!(
                "project id '{}' cannot be used as a file name",
                id
            )));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

#[async_trait]
impl TaskSource for JsonDirSource {
    async fn fetch_tasks(&self, project_id: &EntityId) -> TimelineResult<Vec<TimelineEntity>> {
        let path = self.file_for(project_id)?;
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no task file for project");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let records: Vec<TaskRecord> = serde_json::from_str(&json)?;
        Ok(records.into_iter().map(TimelineEntity::from).collect())
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}
