//! Where a project's tasks come from.
//!
//! The layout engine treats the listing API as a read-only collaborator:
//! anything that can turn a project id into a task list implements
//! [`TaskSource`]. Fetches run off the UI thread through [`FetchDriver`].

pub mod driver;
pub mod http;
pub mod json_dir;
pub mod memory;
pub mod record;

use async_trait::async_trait;

use crate::error::TimelineResult;
use crate::model::{EntityId, TimelineEntity};

pub use driver::{FetchCompletion, FetchDriver};
pub use http::HttpTaskSource;
pub use json_dir::JsonDirSource;
pub use memory::InMemorySource;
pub use record::TaskRecord;

#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch every task belonging to `project_id`.
    async fn fetch_tasks(&self, project_id: &EntityId) -> TimelineResult<Vec<TimelineEntity>>;

    /// Short label for the status bar.
    fn describe(&self) -> String;
}
