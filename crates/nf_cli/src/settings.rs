use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use nf_sources::SourcesConfig;
use nf_storage::StorageConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SETTINGS_FILE: &str = "nf.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sources: SourcesConfig,
    pub inference: nf_inference::Config,
    pub storage: StorageConfig,
    pub cache: CacheSettings,
    pub scheduler: SchedulerSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub response_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { response_ttl_secs: 300 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    /// Bearer token to user id.
    pub tokens: HashMap<String, i64>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            tokens: HashMap::new(),
        }
    }
}

impl Settings {
    /// Read `path`, or `nf.toml` in the working directory when it exists,
    /// or fall back to defaults. Environment keys are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_SETTINGS_FILE).exists() => Self::from_file(Path::new(DEFAULT_SETTINGS_FILE))?,
            None => Self::default(),
        };
        Ok(settings.with_env(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading settings from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing settings in {}", path.display()))
    }

    /// Override provider and model keys from the environment.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_blank("MEDIASTACK_API_KEY") {
            self.sources.mediastack.api_key = Some(key);
        }
        if let Some(key) = non_blank("NEWSAPI_API_KEY") {
            self.sources.newsapi.api_key = Some(key);
        }
        if let Some(key) = non_blank("OPENAI_API_KEY") {
            self.inference.api_key = Some(key);
        }
        self
    }

    pub fn response_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.response_ttl_secs)
    }

    pub fn scheduler_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.interval_secs.max(1))
    }
}
