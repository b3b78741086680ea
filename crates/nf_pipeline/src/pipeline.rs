use std::sync::Arc;

use nf_core::{ArticleStore, Error, NewsSource, SentimentClassifier, Summarizer};

use crate::stages;
use crate::state::PipelineRunState;

pub const DEFAULT_LLM_CONCURRENCY: usize = 4;

/// Retrieve, analyze, summarize and persist the news of one category.
#[derive(Clone)]
pub struct Pipeline {
    source: Arc<dyn NewsSource>,
    classifier: Arc<dyn SentimentClassifier>,
    summarizer: Arc<dyn Summarizer>,
    store: Arc<dyn ArticleStore>,
    llm_concurrency: usize,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn NewsSource>,
        classifier: Arc<dyn SentimentClassifier>,
        summarizer: Arc<dyn Summarizer>,
        store: Arc<dyn ArticleStore>,
    ) -> Self {
        Self {
            source,
            classifier,
            summarizer,
            store,
            llm_concurrency: DEFAULT_LLM_CONCURRENCY,
        }
    }

    /// How many articles are classified or summarized at the same time.
    pub fn with_llm_concurrency(mut self, llm_concurrency: usize) -> Self {
        self.llm_concurrency = llm_concurrency.max(1);
        self
    }

    /// Run every stage for `category`. The outcome is in the returned state,
    /// the articles themselves are read back from the store.
    pub async fn run(&self, category: Option<&str>) -> PipelineRunState {
        let category = category.map(str::trim).unwrap_or_default();
        let state = PipelineRunState::new(category);
        if category.is_empty() {
            tracing::warn!("pipeline run without a category");
            return state.fail(Error::MissingCategory.to_string());
        }

        tracing::info!(category, "pipeline run started");
        let state = stages::retrieve(state, self.source.as_ref()).await;
        let state = stages::analyze_sentiment(state, self.classifier.as_ref(), self.llm_concurrency).await;
        let state = stages::summarize(state, self.summarizer.as_ref(), self.llm_concurrency).await;
        let state = stages::persist(state, self.store.as_ref()).await;

        tracing::info!(
            category,
            stage = ?state.stage,
            saved = state.saved_count,
            "pipeline run finished"
        );
        state
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source.name())
            .field("classifier", &self.classifier.name())
            .field("summarizer", &self.summarizer.name())
            .field("llm_concurrency", &self.llm_concurrency)
            .finish()
    }
}
