pub mod aggregator;
pub mod config;
pub mod providers;

pub use aggregator::{dedup_by_url, SourceAggregator};
pub use config::{ProviderConfig, SourcesConfig};
pub use providers::{MediaStackSource, NewsApiSource};

use std::sync::Arc;
use std::time::Duration;

use nf_core::Result;

/// Build the aggregator for every provider that has an API key.
///
/// MediaStack is registered first, so it wins when both providers return the
/// same url.
pub fn build_aggregator(config: &SourcesConfig) -> Result<SourceAggregator> {
    let mut aggregator = SourceAggregator::new();

    if config.mediastack.is_enabled() {
        let source = MediaStackSource::new(config.mediastack.clone())?;
        aggregator.add_source(Arc::new(source), Duration::from_secs(config.mediastack.timeout_secs));
    } else {
        tracing::warn!("MediaStack API key not configured, provider disabled");
    }

    if config.newsapi.is_enabled() {
        let source = NewsApiSource::new(config.newsapi.clone())?;
        aggregator.add_source(Arc::new(source), Duration::from_secs(config.newsapi.timeout_secs));
    } else {
        tracing::warn!("NewsAPI key not configured, provider disabled");
    }

    Ok(aggregator)
}

pub mod prelude {
    pub use super::{build_aggregator, SourceAggregator, SourcesConfig};
    pub use nf_core::{ArticleDraft, Error, NewsSource, Result};
}
