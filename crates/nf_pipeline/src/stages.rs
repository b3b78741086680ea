//! The four pipeline stages. Each takes the run state by value and returns it.

use futures::stream::{self, StreamExt};
use nf_core::{ArticleDraft, ArticleStore, NewArticle, NewsSource, SentimentClassifier, Sentiment, Summarizer};

use crate::state::{PipelineRunState, PipelineStage};

pub async fn retrieve(mut state: PipelineRunState, source: &dyn NewsSource) -> PipelineRunState {
    match source.fetch(&state.category).await {
        Ok(articles) => state.articles = articles,
        Err(e) => {
            // Upstream trouble means an empty run, not a failed one.
            tracing::warn!(category = %state.category, error = %e, "retrieval failed");
            state.articles.clear();
        }
    }
    tracing::info!(category = %state.category, count = state.articles.len(), "retrieved articles");
    state.advance(PipelineStage::AnalyzingSentiment)
}

pub async fn analyze_sentiment(
    mut state: PipelineRunState,
    classifier: &dyn SentimentClassifier,
    concurrency: usize,
) -> PipelineRunState {
    let articles = std::mem::take(&mut state.articles);
    state.articles = stream::iter(articles)
        .map(|mut draft: ArticleDraft| async move {
            match classifier.classify(&draft.title, &draft.description).await {
                Ok(sentiment) => draft.sentiment = Some(sentiment),
                Err(e) => {
                    tracing::warn!(url = %draft.url, error = %e, "sentiment analysis failed");
                    draft.sentiment = Some(Sentiment::Unknown);
                    draft.note_error(format!("sentiment: {e}"));
                }
            }
            draft
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    state.advance(PipelineStage::Summarizing)
}

pub async fn summarize(mut state: PipelineRunState, summarizer: &dyn Summarizer, concurrency: usize) -> PipelineRunState {
    let articles = std::mem::take(&mut state.articles);
    state.articles = stream::iter(articles)
        .map(|mut draft: ArticleDraft| async move {
            let sentiment = draft.sentiment.unwrap_or_default();
            match summarizer.summarize(&draft.title, &draft.description, sentiment).await {
                Ok(summary) => draft.summary = Some(summary),
                Err(e) => {
                    tracing::warn!(url = %draft.url, error = %e, "summarization failed");
                    draft.summary = Some(String::new());
                    draft.note_error(format!("summary: {e}"));
                }
            }
            draft
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    state.advance(PipelineStage::Persisting)
}

pub async fn persist(mut state: PipelineRunState, store: &dyn ArticleStore) -> PipelineRunState {
    if state.articles.is_empty() {
        state.saved_count = 0;
        return state.advance(PipelineStage::Done);
    }

    let rows: Vec<NewArticle> = state.articles.iter().map(ArticleDraft::to_enriched).collect();
    match store.upsert_many(&rows).await {
        Ok(saved) => {
            state.saved_count = saved;
            tracing::info!(category = %state.category, saved, "persisted articles");
            state.advance(PipelineStage::Done)
        }
        Err(e) => {
            tracing::error!(category = %state.category, error = %e, "persisting articles failed");
            state.fail(e.to_string())
        }
    }
}
