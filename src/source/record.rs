use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::model::{EntityId, TimelineEntity};

/// One task as the listing API returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "wire_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "wire_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Accepts `2024-01-10` as well as full timestamps such as
/// `2024-01-10T00:00:00.000Z`; the calendar date in the given offset is kept.
fn wire_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    parse_wire_date(raw)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid date '{}'", raw)))
}

fn parse_wire_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

impl From<TaskRecord> for TimelineEntity {
    fn from(record: TaskRecord) -> Self {
        let mut entity = TimelineEntity {
            id: EntityId::new(record.id),
            title: record.title,
            status: record.status,
            start: record.start_date,
            end: record.due_date,
            progress: record.progress.min(100) as u8,
            parent_id: record.parent_id.map(EntityId::new),
            tags: record.tags.into_iter().collect::<BTreeSet<_>>(),
        };
        entity.normalize();
        entity
    }
}
