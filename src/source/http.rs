//! Task listing over HTTP.
//!
//! `GET {base_url}/projects/{id}/tasks` returns a JSON array of task records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::{TaskRecord, TaskSource};
use crate::error::{TimelineError, TimelineResult};
use crate::model::{EntityId, TimelineEntity};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone)]
pub struct HttpTaskSource {
    client: Client,
    base_url: Url,
}

impl HttpTaskSource {
    pub fn new(base_url: &str, timeout: Duration) -> TimelineResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TimelineError::InvalidInput(format!("bad API url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TimelineError::InvalidInput(format!(
                "API url '{}' cannot take a path",
                base_url
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn tasks_url(&self, project_id: &EntityId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["projects", project_id.as_str(), "tasks"]);
        }
        url
    }
}

#[async_trait]
impl TaskSource for HttpTaskSource {
    async fn fetch_tasks(&self, project_id: &EntityId) -> TimelineResult<Vec<TimelineEntity>> {
        let url = self.tasks_url(project_id);
        tracing::debug!(%url, "fetching project tasks");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TimelineError::ApiStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let records: Vec<TaskRecord> = response.json().await?;
        Ok(records.into_iter().map(TimelineEntity::from).collect())
    }

    fn describe(&self) -> String {
        format!("API {}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_id_becomes_an_escaped_path_segment() {
        let source = HttpTaskSource::new("https://example.test/api/", Duration::from_secs(5)).unwrap();
        let url = source.tasks_url(&EntityId::from("a b/c"));
        assert_eq!(url.as_str(), "https://example.test/api/projects/a%20b%2Fc/tasks");
    }

    #[test]
    fn rejects_urls_without_a_path() {
        assert!(HttpTaskSource::new("mailto:ops@example.test", Duration::from_secs(1)).is_err());
        assert!(HttpTaskSource::new("not a url", Duration::from_secs(1)).is_err());
    }
}
