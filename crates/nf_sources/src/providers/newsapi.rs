use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use nf_core::{ArticleDraft, Error, NewsSource, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{endpoint, http_client, non_empty, parse_timestamp, window};
use crate::config::ProviderConfig;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Deserialize)]
pub(crate) struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewsApiItem {
    source: Option<NewsApiSourceRef>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewsApiSourceRef {
    name: Option<String>,
}

pub struct NewsApiSource {
    client: Client,
    endpoint: Url,
    config: ProviderConfig,
}

impl NewsApiSource {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            endpoint: endpoint(&config.base_url, DEFAULT_BASE_URL)?,
            config,
        })
    }
}

pub(crate) fn normalize(
    item: NewsApiItem,
    provider: &str,
    category: &str,
    retrieved_at: DateTime<Utc>,
) -> Option<ArticleDraft> {
    let url = non_empty(item.url)?;
    let source = non_empty(item.source.and_then(|s| s.name)).unwrap_or_else(|| provider.to_string());
    let published_at = item
        .published_at
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(retrieved_at);

    let mut draft = ArticleDraft::new(url, item.title.unwrap_or_default(), category)
        .with_description(item.description.unwrap_or_default())
        .with_source(source)
        .with_published_at(published_at);
    draft.image_url = non_empty(item.url_to_image);
    Some(draft)
}

impl std::fmt::Debug for NewsApiSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiSource")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch(&self, category: &str) -> Result<Vec<ArticleDraft>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("NewsAPI key is required".to_string()))?;
        let (from, to) = window(self.config.lookback_minutes);
        let page_size = self.config.page_size.min(100).to_string();
        let from = from.to_rfc3339_opts(SecondsFormat::Secs, true);
        let to = to.to_rfc3339_opts(SecondsFormat::Secs, true);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("apiKey", api_key),
                ("q", category),
                ("pageSize", page_size.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("sortBy", "publishedAt"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Source(format!("NewsAPI returned HTTP {}", response.status())));
        }

        let body: NewsApiResponse = response.json().await?;
        let retrieved_at = Utc::now();
        let drafts: Vec<ArticleDraft> = body
            .articles
            .into_iter()
            .filter_map(|item| normalize(item, self.name(), category, retrieved_at))
            .collect();
        tracing::debug!("NewsAPI returned {} articles for {}", drafts.len(), category);
        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FIXTURE: &str = r#"{
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "source": {"id": "the-verge", "name": "The Verge"},
                "author": "Sam Doe",
                "title": "New phone announced",
                "description": "It folds twice.",
                "url": "https://verge.example.com/phone",
                "urlToImage": "https://verge.example.com/phone.png",
                "publishedAt": "2024-03-01T09:15:00Z",
                "content": "It folds twice... [+1200 chars]"
            },
            {
                "source": {"id": null, "name": null},
                "title": "Removed",
                "description": null,
                "url": "",
                "urlToImage": null,
                "publishedAt": "2024-03-01T09:00:00Z"
            },
            {
                "source": null,
                "title": null,
                "description": "untitled item",
                "url": "https://verge.example.com/untitled",
                "urlToImage": null,
                "publishedAt": null
            }
        ]
    }"#;

    #[test]
    fn test_normalize_newsapi_payload() {
        let body: NewsApiResponse = serde_json::from_str(FIXTURE).unwrap();
        let retrieved_at = Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap();
        let drafts: Vec<_> = body
            .articles
            .into_iter()
            .filter_map(|item| normalize(item, "NewsAPI", "technology", retrieved_at))
            .collect();

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].source, "The Verge");
        assert_eq!(drafts[0].image_url.as_deref(), Some("https://verge.example.com/phone.png"));
        assert_eq!(drafts[0].published_at, Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap());
        assert_eq!(drafts[0].description, "It folds twice.");

        assert_eq!(drafts[1].source, "NewsAPI");
        assert_eq!(drafts[1].title, "");
        assert_eq!(drafts[1].published_at, retrieved_at);
    }

    #[test]
    fn test_error_payload_has_no_articles() {
        let body: NewsApiResponse =
            serde_json::from_str(r#"{"status": "error", "code": "apiKeyInvalid", "message": "bad key"}"#).unwrap();
        assert!(body.articles.is_empty());
    }
}
