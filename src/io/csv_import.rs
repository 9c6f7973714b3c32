use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{TimelineError, TimelineResult};
use crate::model::entity::MILESTONE_TAG;
use crate::model::{EntityId, Portfolio, TimelineEntity};

/// Map a status string to a progress percentage.
fn status_to_progress(status: &str) -> u8 {
    match status.trim().to_lowercase().as_str() {
        "finished" | "done" | "complete" | "completed" => 100,
        "in progress" | "in-progress" | "in_progress" | "active" | "started" => 50,
        "released" | "planned" => 25,
        _ => 0,
    }
}

/// Parse "40", "40%" or "0.4" into a percentage.
fn parse_progress(s: &str) -> Option<u8> {
    let s = s.trim().trim_end_matches('%').trim();
    if s.is_empty() {
        return None;
    }
    let value: f64 = s.parse().ok()?;
    let percent = if s.contains('.') && value <= 1.0 {
        value * 100.0
    } else {
        value
    };
    Some(percent.round().clamp(0.0, 100.0) as u8)
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d", "%m-%d-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Name,
    Start,
    End,
    Status,
    Progress,
    Parent,
    Project,
    Tags,
    Milestone,
}

fn header_to_col(normalized: &str) -> Option<Column> {
    match normalized {
        "id" | "key" | "ref" => Some(Column::Id),

        "name" | "task" | "tasklabel" | "taskname" | "label" | "title" | "activity" => {
            Some(Column::Name)
        }

        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Column::Start),

        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => Some(Column::End),

        "status" | "state" | "stage" => Some(Column::Status),

        "progress" | "percent" | "complete" | "percentcomplete" | "done" => Some(Column::Progress),

        "parent" | "parenttask" | "parentname" | "subtaskof" => Some(Column::Parent),

        "project" | "projectname" | "portfolioproject" => Some(Column::Project),

        "tags" | "labels" => Some(Column::Tags),

        "milestone" | "ismilestone" | "type" => Some(Column::Milestone),

        _ => None,
    }
}

#[derive(Debug, Default)]
struct Row {
    line: usize,
    id: Option<String>,
    name: String,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    progress: u8,
    status: String,
    parent: Option<String>,
    project: Option<String>,
    tags: Vec<String>,
    milestone: bool,
}

impl Row {
    fn into_entity(self) -> TimelineEntity {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .map(EntityId::new)
            .unwrap_or_else(EntityId::generate);
        let mut entity = TimelineEntity::new(id, self.name, self.start, self.end)
            .with_progress(self.progress)
            .with_status(self.status);
        for tag in self.tags {
            entity = entity.with_tag(tag);
        }
        if self.milestone && !entity.is_milestone() {
            entity = entity.with_tag(MILESTONE_TAG);
        }
        entity
    }
}

fn optional_date(raw: Option<&str>, line: usize, column: &str) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        tracing::warn!(line, column, value = raw, "unparseable date, leaving it empty");
    }
    parsed
}

/// Import a portfolio from a CSV file.
///
/// Auto-detects delimiter (comma, semicolon, tab) and matches headers
/// flexibly. Rows with an empty project column are projects; rows naming a
/// project are its tasks, and their `parent` column names another task of the
/// same project. Returns `(portfolio, skipped_count)`.
pub fn import_csv(path: &Path) -> TimelineResult<(Portfolio, usize)> {
    let content = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Imported Portfolio");
    import_csv_str(&content, name)
}

/// [`import_csv`] over an in-memory document.
pub fn import_csv_str(content: &str, portfolio_name: &str) -> TimelineResult<(Portfolio, usize)> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let col_map: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_col(&normalize_header(h)))
        .collect();

    let has = |c: Column| col_map.contains(&Some(c));
    if !has(Column::Name) || !has(Column::Start) || !has(Column::End) {
        let found: Vec<&str> = headers.iter().collect();
        return Err(TimelineError::InvalidInput(format!(
            "CSV is missing required columns. Found headers: {:?}. \
             Need columns for: name, start date, end date.",
            found
        )));
    }

    let mut rows: Vec<Row> = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(line, error = %e, "skipping CSV row");
                skipped += 1;
                continue;
            }
        };

        let field = |c: Column| {
            col_map
                .iter()
                .position(|m| *m == Some(c))
                .and_then(|idx| record.get(idx))
                .map(str::trim)
        };
        let non_empty = |c: Column| field(c).filter(|s| !s.is_empty()).map(str::to_string);

        let name = match non_empty(Column::Name) {
            Some(n) => n,
            None => {
                skipped += 1;
                continue;
            }
        };

        let status = field(Column::Status).unwrap_or("").to_string();
        let progress = field(Column::Progress)
            .and_then(parse_progress)
            .unwrap_or_else(|| status_to_progress(&status));

        let milestone_raw = field(Column::Milestone).unwrap_or("");
        let milestone = matches!(
            milestone_raw.to_lowercase().as_str(),
            "true" | "yes" | "1" | "milestone"
        );

        let tags = field(Column::Tags)
            .map(|s| {
                s.split('|')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        rows.push(Row {
            line,
            id: non_empty(Column::Id),
            start: optional_date(field(Column::Start), line, "start"),
            end: optional_date(field(Column::End), line, "end"),
            name,
            progress,
            status,
            parent: non_empty(Column::Parent),
            project: non_empty(Column::Project),
            tags,
            milestone,
        });
    }

    if rows.is_empty() {
        return Err(TimelineError::InvalidInput(if skipped > 0 {
            format!("No valid rows found in CSV ({} rows skipped)", skipped)
        } else {
            "CSV file is empty or has no data rows".to_string()
        }));
    }

    let (project_rows, task_rows): (Vec<Row>, Vec<Row>) =
        rows.into_iter().partition(|r| r.project.is_none());

    let mut portfolio = Portfolio::new(portfolio_name);
    let mut project_ids: HashMap<String, EntityId> = HashMap::new();
    for row in project_rows {
        let entity = row.into_entity();
        project_ids.insert(entity.title.to_lowercase(), entity.id.clone());
        portfolio.projects.push(entity);
    }

    // Tasks grouped per project, each with its raw parent name.
    let mut grouped: HashMap<EntityId, Vec<(TimelineEntity, Option<String>)>> = HashMap::new();
    for mut row in task_rows {
        let project_name = row.project.take().unwrap_or_default();
        let Some(project_id) = project_ids.get(&project_name.to_lowercase()) else {
            tracing::warn!(line = row.line, project = %project_name, "task names an unknown project, skipping");
            skipped += 1;
            continue;
        };
        let parent = row.parent.take();
        grouped
            .entry(project_id.clone())
            .or_default()
            .push((row.into_entity(), parent));
    }

    // Second pass: resolve parent names to ids within each project.
    for (project_id, entries) in grouped {
        let name_to_id: HashMap<String, EntityId> = entries
            .iter()
            .map(|(t, _)| (t.title.to_lowercase(), t.id.clone()))
            .collect();

        let tasks = entries
            .into_iter()
            .map(|(mut task, parent)| {
                if let Some(pname) = parent {
                    match name_to_id.get(&pname.to_lowercase()) {
                        Some(pid) if *pid != task.id => task.parent_id = Some(pid.clone()),
                        Some(_) => {}
                        None => tracing::warn!(
                            parent = %pname,
                            task = %task.title,
                            "parent task not found"
                        ),
                    }
                }
                task
            })
            .collect();
        portfolio.tasks.insert(project_id, tasks);
    }

    tracing::info!(
        projects = portfolio.projects.len(),
        skipped,
        "CSV portfolio imported"
    );
    Ok((portfolio, skipped))
}
