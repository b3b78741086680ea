use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use nf_core::{ArticleDraft, NewsSource, Result};
use tracing::{debug, info, warn};

struct ProviderSlot {
    source: Arc<dyn NewsSource>,
    timeout: Duration,
}

/// Fans a category query out to every registered provider and merges the
/// answers into one url-unique list.
#[derive(Default)]
pub struct SourceAggregator {
    providers: Vec<ProviderSlot>,
}

impl SourceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Registration order decides which copy of a
    /// duplicated url is kept.
    pub fn add_source(&mut self, source: Arc<dyn NewsSource>, timeout: Duration) {
        info!("Registering news provider: {}", source.name());
        self.providers.push(ProviderSlot { source, timeout });
    }

    pub fn with_source(mut self, source: Arc<dyn NewsSource>, timeout: Duration) -> Self {
        self.add_source(source, timeout);
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|slot| slot.source.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Query all providers in parallel. Never fails: a provider that errors
    /// or times out contributes nothing.
    pub async fn fetch_all(&self, category: &str) -> Vec<ArticleDraft> {
        let fetches = self.providers.iter().map(|slot| async move {
            let name = slot.source.name();
            match tokio::time::timeout(slot.timeout, slot.source.fetch(category)).await {
                Ok(Ok(drafts)) => {
                    debug!("{} returned {} articles for {}", name, drafts.len(), category);
                    drafts
                }
                Ok(Err(e)) => {
                    warn!(provider = name, category, "provider request failed: {}", e);
                    Vec::new()
                }
                Err(_) => {
                    warn!(provider = name, category, "provider timed out after {:?}", slot.timeout);
                    Vec::new()
                }
            }
        });

        let per_provider = join_all(fetches).await;
        let merged = dedup_by_url(per_provider.into_iter().flatten());
        info!("Aggregated {} unique articles for {}", merged.len(), category);
        merged
    }
}

#[async_trait]
impl NewsSource for SourceAggregator {
    fn name(&self) -> &str {
        "aggregator"
    }

    async fn fetch(&self, category: &str) -> Result<Vec<ArticleDraft>> {
        Ok(self.fetch_all(category).await)
    }
}

/// Keep the first draft seen for each url, in input order. Drafts with a
/// blank url are dropped.
pub fn dedup_by_url<I>(drafts: I) -> Vec<ArticleDraft>
where
    I: IntoIterator<Item = ArticleDraft>,
{
    let mut seen = HashSet::new();
    drafts
        .into_iter()
        .filter(|draft| {
            let url = draft.url.trim();
            !url.is_empty() && seen.insert(url.to_string())
        })
        .collect()
}
