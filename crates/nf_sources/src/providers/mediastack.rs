use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nf_core::{ArticleDraft, Error, NewsSource, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{endpoint, http_client, non_empty, parse_timestamp, window};
use crate::config::ProviderConfig;

pub const DEFAULT_BASE_URL: &str = "http://api.mediastack.com/v1/news";

const DATE_FORMAT: &str = "%Y-%m-%d,%H:%M";

#[derive(Debug, Deserialize)]
pub(crate) struct MediaStackResponse {
    #[serde(default)]
    data: Vec<MediaStackItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaStackItem {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    image: Option<String>,
    published_at: Option<String>,
    source: Option<String>,
}

pub struct MediaStackSource {
    client: Client,
    endpoint: Url,
    config: ProviderConfig,
}

impl MediaStackSource {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            endpoint: endpoint(&config.base_url, DEFAULT_BASE_URL)?,
            config,
        })
    }
}

pub(crate) fn normalize(
    item: MediaStackItem,
    provider: &str,
    category: &str,
    retrieved_at: DateTime<Utc>,
) -> Option<ArticleDraft> {
    let url = non_empty(item.url)?;
    let published_at = item
        .published_at
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(retrieved_at);

    let mut draft = ArticleDraft::new(url, item.title.unwrap_or_default(), category)
        .with_description(item.description.unwrap_or_default())
        .with_source(non_empty(item.source).unwrap_or_else(|| provider.to_string()))
        .with_published_at(published_at);
    draft.image_url = non_empty(item.image);
    Some(draft)
}

impl std::fmt::Debug for MediaStackSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStackSource")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl NewsSource for MediaStackSource {
    fn name(&self) -> &str {
        "MediaStack"
    }

    async fn fetch(&self, category: &str) -> Result<Vec<ArticleDraft>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("MediaStack API key is required".to_string()))?;
        let (from, to) = window(self.config.lookback_minutes);
        let limit = self.config.page_size.to_string();
        let date_from = from.format(DATE_FORMAT).to_string();
        let date_to = to.format(DATE_FORMAT).to_string();

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("access_key", api_key),
                ("categories", category),
                ("limit", limit.as_str()),
                ("date_from", date_from.as_str()),
                ("date_to", date_to.as_str()),
                ("sort", "published_desc"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Source(format!("MediaStack returned HTTP {}", response.status())));
        }

        let body: MediaStackResponse = response.json().await?;
        let retrieved_at = Utc::now();
        let drafts: Vec<ArticleDraft> = body
            .data
            .into_iter()
            .filter_map(|item| normalize(item, self.name(), category, retrieved_at))
            .collect();
        tracing::debug!("MediaStack returned {} articles for {}", drafts.len(), category);
        Ok(drafts)
    }
}
