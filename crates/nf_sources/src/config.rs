use serde::{Deserialize, Serialize};

/// Settings for one upstream news API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Upper bound on articles requested per call.
    pub page_size: u32,
    /// How far back from now the query window reaches.
    pub lookback_minutes: u32,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            timeout_secs: 10,
            page_size: 100,
            lookback_minutes: 60,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub mediastack: ProviderConfig,
    pub newsapi: ProviderConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            mediastack: ProviderConfig::new(crate::providers::mediastack::DEFAULT_BASE_URL),
            newsapi: ProviderConfig::new(crate::providers::newsapi::DEFAULT_BASE_URL),
        }
    }
}
