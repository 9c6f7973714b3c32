use std::collections::HashSet;

use super::entity::{EntityId, TimelineEntity};

/// Display grouping of one project's tasks. Borrowed from the cached list,
/// recomputed whenever it is rendered.
#[derive(Debug, Default)]
pub struct TaskPartition<'a> {
    /// No parent and not a milestone.
    pub top_level: Vec<&'a TimelineEntity>,
    /// Any task with a parent, milestone or not.
    pub subtasks: Vec<&'a TimelineEntity>,
    /// Any milestone-tagged task, parented or not.
    pub milestones: Vec<&'a TimelineEntity>,
}

impl<'a> TaskPartition<'a> {
    pub fn of(tasks: &'a [TimelineEntity]) -> Self {
        let mut partition = Self::default();
        for task in tasks {
            let milestone = task.is_milestone();
            if task.parent_id.is_some() {
                partition.subtasks.push(task);
            } else if !milestone {
                partition.top_level.push(task);
            }
            if milestone {
                partition.milestones.push(task);
            }
        }
        partition
    }

    /// Subtasks whose parent is `task_id`, in source order.
    pub fn subtasks_of<'s>(
        &'s self,
        task_id: &'s EntityId,
    ) -> impl Iterator<Item = &'a TimelineEntity> + 's {
        self.subtasks
            .iter()
            .copied()
            .filter(move |t| t.parent_id.as_ref() == Some(task_id))
    }

    /// Every non-milestone task in display order with its nesting depth
    /// (1 = directly under the project). Each top-level task is followed by
    /// its descendants, depth first. Subtasks whose parent is not in the list
    /// (or is a milestone) start their own branch at depth 1, and tasks caught
    /// in a parent cycle are placed last. Each task appears once.
    pub fn outline(&self) -> Vec<(&'a TimelineEntity, u8)> {
        let mut rows = Vec::new();
        let mut placed: HashSet<&'a EntityId> = HashSet::new();

        for &task in &self.top_level {
            self.push_branch(task, 1, &mut rows, &mut placed);
        }

        let parents: HashSet<&EntityId> = self
            .top_level
            .iter()
            .chain(&self.subtasks)
            .filter(|t| !t.is_milestone())
            .map(|t| &t.id)
            .collect();
        let orphaned = |t: &TimelineEntity| {
            t.parent_id
                .as_ref()
                .map_or(true, |parent| !parents.contains(parent))
        };
        for &task in &self.subtasks {
            if !task.is_milestone() && orphaned(task) {
                self.push_branch(task, 1, &mut rows, &mut placed);
            }
        }

        for &task in &self.subtasks {
            if !task.is_milestone() {
                self.push_branch(task, 1, &mut rows, &mut placed);
            }
        }
        rows
    }

    fn push_branch(
        &self,
        task: &'a TimelineEntity,
        depth: u8,
        rows: &mut Vec<(&'a TimelineEntity, u8)>,
        placed: &mut HashSet<&'a EntityId>,
    ) {
        if !placed.insert(&task.id) {
            return;
        }
        rows.push((task, depth));
        for child in self.subtasks_of(&task.id) {
            if !child.is_milestone() {
                self.push_branch(child, depth.saturating_add(1), rows, placed);
            }
        }
    }
}
