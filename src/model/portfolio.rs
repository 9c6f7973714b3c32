use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, TimelineEntity};

/// A set of projects shown together on one timeline.
///
/// `tasks` optionally carries each project's tasks inline; when present it
/// backs an in-memory task source instead of a remote one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub name: String,
    pub projects: Vec<TimelineEntity>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tasks: BTreeMap<EntityId, Vec<TimelineEntity>>,
    #[serde(default = "Utc::now")]
    pub modified: DateTime<Utc>,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self {
            name: "Untitled Portfolio".to_string(),
            projects: Vec::new(),
            tasks: BTreeMap::new(),
            modified: Utc::now(),
        }
    }
}

impl Portfolio {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn project(&self, id: &EntityId) -> Option<&TimelineEntity> {
        self.projects.iter().find(|p| &p.id == id)
    }

    /// Apply the date and progress invariants to every entity.
    /// Returns how many entities had to be corrected.
    pub fn normalize(&mut self) -> usize {
        self.projects
            .iter_mut()
            .chain(self.tasks.values_mut().flatten())
            .map(TimelineEntity::normalize)
            .filter(|changed| *changed)
            .count()
    }
}
