use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag that turns an entity into a milestone (matched case-insensitively).
pub const MILESTONE_TAG: &str = "milestone";

/// Opaque identifier of a project or task, unique within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id, used for rows that arrive without one (CSV import).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A project, task, subtask or milestone placed on the shared timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntity {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    /// Completion percentage, 0..=100. Display only.
    #[serde(default)]
    pub progress: u8,
    /// Grouping only; a child's dates never depend on its parent.
    #[serde(default)]
    pub parent_id: Option<EntityId>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl TimelineEntity {
    /// Create an entity. Dates are normalized on the way in.
    pub fn new(
        id: impl Into<EntityId>,
        title: impl Into<String>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Self {
        let mut entity = Self {
            id: id.into(),
            title: title.into(),
            status: String::new(),
            start,
            end,
            progress: 0,
            parent_id: None,
            tags: BTreeSet::new(),
        };
        entity.normalize();
        entity
    }

    /// Create a single-day milestone.
    pub fn new_milestone(id: impl Into<EntityId>, title: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(id, title, Some(date), Some(date)).with_tag(MILESTONE_TAG)
    }

    pub fn with_parent(mut self, parent: impl Into<EntityId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn is_milestone(&self) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(MILESTONE_TAG))
    }

    /// Both dates, if the entity can be placed on a timeline at all.
    pub fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start?, self.end?))
    }

    /// Bring the entity in line with the layout invariants: `end` is clamped
    /// to `start` when it precedes it, `progress` is capped at 100.
    /// Returns `true` if anything had to change.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                tracing::warn!(
                    id = %self.id,
                    %start,
                    %end,
                    "end date precedes start date, clamping end to start"
                );
                self.end = Some(start);
                changed = true;
            }
        }
        if self.progress > 100 {
            self.progress = 100;
            changed = true;
        }
        changed
    }
}
