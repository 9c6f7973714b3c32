use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use super::TaskSource;
use crate::error::TimelineResult;
use crate::model::{EntityId, TimelineEntity};

/// Tasks held in memory, typically the inline `tasks` of a portfolio file.
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    tasks: HashMap<EntityId, Vec<TimelineEntity>>,
}

impl InMemorySource {
    pub fn new(tasks: HashMap<EntityId, Vec<TimelineEntity>>) -> Self {
        Self { tasks }
    }
}

impl From<BTreeMap<EntityId, Vec<TimelineEntity>>> for InMemorySource {
    fn from(tasks: BTreeMap<EntityId, Vec<TimelineEntity>>) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
        }
    }
}

#[async_trait]
impl TaskSource for InMemorySource {
    async fn fetch_tasks(&self, project_id: &EntityId) -> TimelineResult<Vec<TimelineEntity>> {
        Ok(self.tasks.get(project_id).cloned().unwrap_or_default())
    }

    fn describe(&self) -> String {
        format!("in-memory ({} projects)", self.tasks.len())
    }
}
