use portfolio_gantt::model::{
    EntityId, ExpansionCache, RowState, TaskPartition, TimelineEntity, Tier,
};

/// One visual row of the chart and the project list.
#[derive(Debug, Clone, Copy)]
pub enum ChartRow<'a> {
    Project {
        entity: &'a TimelineEntity,
        index: usize,
        expanded: bool,
    },
    Task {
        entity: &'a TimelineEntity,
        project_index: usize,
        depth: u8,
    },
    Milestone {
        entity: &'a TimelineEntity,
        project_index: usize,
    },
    Loading,
    Failed {
        project_id: &'a EntityId,
        message: &'a str,
    },
    NoTasks,
}

impl<'a> ChartRow<'a> {
    pub fn entity(&self) -> Option<&'a TimelineEntity> {
        match *self {
            ChartRow::Project { entity, .. }
            | ChartRow::Task { entity, .. }
            | ChartRow::Milestone { entity, .. } => Some(entity),
            _ => None,
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            ChartRow::Project { .. } => Tier::Project,
            _ => Tier::Task,
        }
    }

    pub fn depth(&self) -> u8 {
        match self {
            ChartRow::Project { .. } => 0,
            ChartRow::Task { depth, .. } => *depth,
            _ => 1,
        }
    }
}

/// Flatten projects and their expanded tasks into display order: the task
/// outline (each task followed by its descendants), then the milestones.
pub fn build_rows<'a>(projects: &'a [TimelineEntity], cache: &'a ExpansionCache) -> Vec<ChartRow<'a>> {
    let mut rows = Vec::with_capacity(projects.len());
    for (index, project) in projects.iter().enumerate() {
        let state = cache.row_state(&project.id);
        rows.push(ChartRow::Project {
            entity: project,
            index,
            expanded: !matches!(state, RowState::Collapsed),
        });
        match state {
            RowState::Collapsed => {}
            RowState::Loading => rows.push(ChartRow::Loading),
            RowState::Failed(message) => rows.push(ChartRow::Failed {
                project_id: &project.id,
                message,
            }),
            RowState::Loaded(tasks) => {
                let partition = TaskPartition::of(tasks);
                let outline = partition.outline();
                if outline.is_empty() && partition.milestones.is_empty() {
                    rows.push(ChartRow::NoTasks);
                    continue;
                }
                for (task, depth) in outline {
                    rows.push(ChartRow::Task {
                        entity: task,
                        project_index: index,
                        depth,
                    });
                }
                for &milestone in &partition.milestones {
                    rows.push(ChartRow::Milestone {
                        entity: milestone,
                        project_index: index,
                    });
                }
            }
        }
    }
    rows
}
