use std::sync::Arc;

use anyhow::Result;
use nf_pipeline::{AggregationScheduler, NewsService, Pipeline, ResponseCache};
use nf_sources::SourceAggregator;
use nf_storage::{create_store, seed_default_interests, StoreHandles};
use nf_web::{AppState, StaticTokenResolver};

use crate::settings::Settings;

/// Stores and providers. Enough for every command that never calls a model.
pub struct Services {
    pub stores: StoreHandles,
    pub aggregator: Arc<SourceAggregator>,
    pub scheduler: AggregationScheduler,
}

/// The LLM-backed half: the pipeline and the request flow on top of it.
pub struct Enrichment {
    pub pipeline: Arc<Pipeline>,
    pub news: NewsService,
}

pub async fn build(settings: &Settings) -> Result<Services> {
    let stores = create_store(&settings.storage).await?;
    seed_default_interests(stores.interests.as_ref()).await?;

    let aggregator = Arc::new(nf_sources::build_aggregator(&settings.sources)?);
    if aggregator.is_empty() {
        tracing::warn!("no news provider configured, runs will retrieve nothing");
    } else {
        tracing::info!(providers = ?aggregator.provider_names(), "news providers ready");
    }

    let scheduler = AggregationScheduler::new(aggregator.clone(), stores.articles.clone(), stores.interests.clone())
        .with_interval(settings.scheduler_interval());

    Ok(Services {
        stores,
        aggregator,
        scheduler,
    })
}

impl Services {
    /// Build the models and the pipeline. Fails when the model provider is misconfigured.
    pub fn enrich(&self, settings: &Settings) -> Result<Enrichment> {
        let enrichers = nf_inference::build_enrichers(&settings.inference)?;
        tracing::info!(
            classifier = enrichers.classifier.name(),
            summarizer = enrichers.summarizer.name(),
            "enrichment models ready"
        );

        let pipeline = Arc::new(
            Pipeline::new(
                self.aggregator.clone(),
                enrichers.classifier,
                enrichers.summarizer,
                self.stores.articles.clone(),
            )
            .with_llm_concurrency(settings.inference.concurrency),
        );

        let cache = Arc::new(ResponseCache::new(settings.response_ttl()));
        let news = NewsService::new(
            pipeline.clone(),
            self.stores.articles.clone(),
            self.stores.interests.clone(),
            cache,
        );

        Ok(Enrichment { pipeline, news })
    }
}

pub fn app_state(services: &Services, enrichment: &Enrichment, settings: &Settings) -> AppState {
    if settings.server.tokens.is_empty() {
        tracing::warn!("no API tokens configured, every authenticated route will answer Unauthorized");
    }
    AppState {
        news: enrichment.news.clone(),
        interests: services.stores.interests.clone(),
        bookmarks: services.stores.bookmarks.clone(),
        identity: Arc::new(StaticTokenResolver::new(settings.server.tokens.clone())),
    }
}
