//! Expand/collapse state of project rows and the fetch-once task cache.
//!
//! The cache never performs I/O itself. Expanding an uncached project hands
//! back a [`FetchRequest`]; the owner runs it (see `source::FetchDriver`) and
//! reports the outcome through [`ExpansionCache::complete`].

use std::collections::{HashMap, HashSet};

use super::entity::{EntityId, TimelineEntity};
use crate::error::TimelineResult;

/// A fetch the owner must perform for a project's tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub project_id: EntityId,
}

/// What a toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    Collapsed,
    /// Expanded; tasks are cached or a fetch is already running.
    Expanded,
    /// Expanded and a fetch has to be issued.
    Fetch(FetchRequest),
}

/// Row state of an expanded project, as the chart renders it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowState<'a> {
    Collapsed,
    Loading,
    Failed(&'a str),
    Loaded(&'a [TimelineEntity]),
}

/// Per-view expansion state. Lives as long as the view that owns it.
#[derive(Debug, Default)]
pub struct ExpansionCache {
    expanded: HashSet<EntityId>,
    loaded: HashMap<EntityId, Vec<TimelineEntity>>,
    in_flight: HashSet<EntityId>,
    failures: HashMap<EntityId, String>,
}

impl ExpansionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a project between expanded and collapsed.
    ///
    /// Collapsing keeps the cached tasks. Expanding asks for a fetch only when
    /// nothing is cached and nothing is in flight for that id.
    pub fn toggle_expand(&mut self, project_id: &EntityId) -> Toggle {
        if self.expanded.remove(project_id) {
            return Toggle::Collapsed;
        }
        self.expanded.insert(project_id.clone());
        match self.begin_fetch(project_id) {
            Some(request) => Toggle::Fetch(request),
            None => Toggle::Expanded,
        }
    }

    /// Ask again for a project whose last fetch failed.
    pub fn retry(&mut self, project_id: &EntityId) -> Option<FetchRequest> {
        if self.failures.remove(project_id).is_none() {
            return None;
        }
        self.expanded.insert(project_id.clone());
        self.begin_fetch(project_id)
    }

    fn begin_fetch(&mut self, project_id: &EntityId) -> Option<FetchRequest> {
        if self.loaded.contains_key(project_id) || self.in_flight.contains(project_id) {
            return None;
        }
        self.failures.remove(project_id);
        self.in_flight.insert(project_id.clone());
        tracing::debug!(project = %project_id, "requesting project tasks");
        Some(FetchRequest {
            project_id: project_id.clone(),
        })
    }

    /// Record the outcome of a fetch.
    ///
    /// A successful result is stored only if the project has no entry yet;
    /// an entry, once stored, is never replaced. A failure leaves the entry
    /// unset so the next expand or retry fetches again.
    pub fn complete(&mut self, project_id: &EntityId, result: TimelineResult<Vec<TimelineEntity>>) {
        self.in_flight.remove(project_id);
        match result {
            Ok(mut tasks) => {
                if self.loaded.contains_key(project_id) {
                    tracing::debug!(project = %project_id, "ignoring duplicate task list");
                    return;
                }
                for task in &mut tasks {
                    task.normalize();
                }
                tracing::debug!(project = %project_id, count = tasks.len(), "project tasks cached");
                self.failures.remove(project_id);
                self.loaded.insert(project_id.clone(), tasks);
            }
            Err(e) => {
                tracing::warn!(project = %project_id, error = %e, "failed to fetch project tasks");
                self.failures.insert(project_id.clone(), e.to_string());
            }
        }
    }

    pub fn is_expanded(&self, project_id: &EntityId) -> bool {
        self.expanded.contains(project_id)
    }

    pub fn is_loading(&self, project_id: &EntityId) -> bool {
        self.in_flight.contains(project_id)
    }

    pub fn tasks(&self, project_id: &EntityId) -> Option<&[TimelineEntity]> {
        self.loaded.get(project_id).map(Vec::as_slice)
    }

    pub fn failure(&self, project_id: &EntityId) -> Option<&str> {
        self.failures.get(project_id).map(String::as_str)
    }

    pub fn row_state(&self, project_id: &EntityId) -> RowState<'_> {
        if !self.is_expanded(project_id) {
            return RowState::Collapsed;
        }
        if let Some(tasks) = self.tasks(project_id) {
            return RowState::Loaded(tasks);
        }
        if self.is_loading(project_id) {
            return RowState::Loading;
        }
        match self.failure(project_id) {
            Some(message) => RowState::Failed(message),
            None => RowState::Loading,
        }
    }

    /// Every cached task across all projects.
    pub fn loaded_tasks(&self) -> impl Iterator<Item = &TimelineEntity> {
        self.loaded.values().flatten()
    }

    /// Tasks of currently expanded projects, the ones on screen.
    pub fn visible_tasks(&self) -> impl Iterator<Item = &TimelineEntity> {
        self.expanded
            .iter()
            .filter_map(|id| self.loaded.get(id))
            .flatten()
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Forget everything, e.g. when another portfolio is opened.
    pub fn reset(&mut self) {
        self.expanded.clear();
        self.loaded.clear();
        self.in_flight.clear();
        self.failures.clear();
    }
}
