//! Viewer settings, persisted as JSON in the OS config directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};
use crate::source::http::DEFAULT_BASE_URL;
use crate::source::{HttpTaskSource, JsonDirSource, TaskSource};

/// Overrides the configured source with an HTTP source at this base URL.
pub const API_ENV_VAR: &str = "PORTFOLIO_GANTT_API";

/// Where project tasks are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Use the tasks embedded in the opened portfolio file.
    Memory,
    Directory { path: PathBuf },
    Http {
        #[serde(default = "default_base_url")]
        base_url: String,
    },
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub source: SourceConfig,
    pub request_timeout_secs: u64,
    pub log_filter: String,
    pub last_portfolio: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::Memory,
            request_timeout_secs: 30,
            log_filter: "info".to_string(),
            last_portfolio: None,
        }
    }
}

impl ViewerConfig {
    /// `<config dir>/config.json`, or `./config.json` if the OS gives us no
    /// config directory.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "portfolio-gantt")
            .map(|dirs| dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    }

    /// Load settings. A missing file gives defaults. An unreadable or
    /// malformed file is an error; callers fall back to defaults and report it
    /// once logging is up.
    pub fn load(path: &Path) -> TimelineResult<Self> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    /// [`ViewerConfig::load`], falling back to defaults. The error is handed
    /// back so it can be logged after the subscriber is installed.
    pub fn load_or_default(path: &Path) -> (Self, Option<TimelineError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn save(&self, path: &Path) -> TimelineResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply environment overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var(API_ENV_VAR) {
            if !base_url.trim().is_empty() {
                self.source = SourceConfig::Http {
                    base_url: base_url.trim().to_string(),
                };
            }
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// The configured external source, or `None` when tasks come from the
    /// portfolio file itself.
    pub fn build_source(&self) -> TimelineResult<Option<Arc<dyn TaskSource>>> {
        let source: Arc<dyn TaskSource> = match &self.source {
            SourceConfig::Memory => return Ok(None),
            SourceConfig::Directory { path } => Arc::new(JsonDirSource::new(path.clone())),
            SourceConfig::Http { base_url } => {
                Arc::new(HttpTaskSource::new(base_url, self.request_timeout())?)
            }
        };
        Ok(Some(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.source, SourceConfig::Memory);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn malformed_file_is_reported_and_replaced_by_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ViewerConfig::load(&path), Err(TimelineError::Json(_))));

        let (config, error) = ViewerConfig::load_or_default(&path);
        assert_eq!(config.log_filter, "info");
        assert!(matches!(error, Some(TimelineError::Json(_))));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (_, error) = ViewerConfig::load_or_default(&dir.path().join("absent.json"));
        assert!(error.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"source": {"kind": "http", "base_url": "https://pm.example.test/api"}}"#,
        )
        .unwrap();
        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(
            config.source,
            SourceConfig::Http {
                base_url: "https://pm.example.test/api".into()
            }
        );
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ViewerConfig {
            source: SourceConfig::Directory {
                path: PathBuf::from("/srv/tasks"),
            },
            request_timeout_secs: 5,
            log_filter: "debug".into(),
            last_portfolio: Some(PathBuf::from("q3.portfolio.json")),
        };
        config.save(&path).unwrap();
        let loaded = ViewerConfig::load(&path).unwrap();
        assert_eq!(loaded.source, config.source);
        assert_eq!(loaded.last_portfolio, config.last_portfolio);
    }

    #[test]
    fn memory_source_builds_nothing() {
        assert!(ViewerConfig::default().build_source().unwrap().is_none());
    }

    #[test]
    fn http_source_without_url_uses_the_default_api() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"source": {"kind": "http"}}"#).unwrap();
        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(
            config.source,
            SourceConfig::Http {
                base_url: DEFAULT_BASE_URL.into()
            }
        );
        let source = config.build_source().unwrap().unwrap();
        assert!(source.describe().contains("localhost:3000"));
    }

    #[test]
    fn default_path_lives_in_the_app_folder() {
        let path = ViewerConfig::default_path();
        assert_eq!(path.file_name().unwrap(), "config.json");
        if path.components().count() > 1 {
            assert!(
                path.components().any(|c| c.as_os_str() == "portfolio-gantt"),
                "{}",
                path.display()
            );
        }
    }
}
