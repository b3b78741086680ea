use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use nf_core::{
    Article, ArticleStore, CategoryFilter, Error, InterestStore, ProcessingStatus, Result, TtlCache, UserId,
};

use crate::pipeline::Pipeline;

pub const DEFAULT_RESPONSE_TTL: Duration = Duration::from_secs(300);

/// Article lists keyed by user and category (or `"all"`).
pub type ResponseCache = TtlCache<(UserId, String), Vec<Article>>;

/// Serves a user's news: cache first, then fresh pipeline runs and a store read.
#[derive(Clone)]
pub struct NewsService {
    pipeline: Arc<Pipeline>,
    articles: Arc<dyn ArticleStore>,
    interests: Arc<dyn InterestStore>,
    cache: Arc<ResponseCache>,
}

impl NewsService {
    pub fn new(
        pipeline: Arc<Pipeline>,
        articles: Arc<dyn ArticleStore>,
        interests: Arc<dyn InterestStore>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            pipeline,
            articles,
            interests,
            cache,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Drop every cached list of `user`, e.g. after their interests change.
    pub fn invalidate_user(&self, user: UserId) -> usize {
        self.cache.remove_where(|(owner, _)| *owner == user)
    }

    pub async fn news_for(&self, user: UserId, category: Option<&str>) -> Result<Vec<Article>> {
        let filter = CategoryFilter::parse(category);
        let key = (user, filter.as_key().to_string());
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(user, category = %key.1, "news served from cache");
            return Ok(hit);
        }

        let articles = match &filter {
            CategoryFilter::All => self.news_for_interests(user).await?,
            CategoryFilter::Named(name) => self.news_for_category(name).await?,
        };

        self.cache.insert(key, articles.clone());
        Ok(articles)
    }

    async fn news_for_category(&self, category: &str) -> Result<Vec<Article>> {
        let state = self.pipeline.run(Some(category)).await;
        if state.is_failed() {
            let message = state.error.unwrap_or_else(|| "pipeline run failed".to_string());
            return Err(Error::Processing(message));
        }

        self.articles
            .query_by_status_and_category(ProcessingStatus::Completed, &CategoryFilter::Named(category.to_string()))
            .await
    }

    async fn news_for_interests(&self, user: UserId) -> Result<Vec<Article>> {
        let interests = self.interests.user_interests(user).await?;
        let names: HashSet<String> = interests.into_iter().map(|i| i.name).collect();

        let runs = join_all(names.iter().map(|name| self.pipeline.run(Some(name)))).await;
        for state in runs.iter().filter(|s| s.is_failed()) {
            tracing::warn!(
                category = %state.category,
                error = state.error.as_deref().unwrap_or_default(),
                "skipping failed pipeline run"
            );
        }

        let completed = self
            .articles
            .query_by_status_and_category(ProcessingStatus::Completed, &CategoryFilter::All)
            .await?;
        if names.is_empty() {
            return Ok(completed);
        }
        Ok(completed.into_iter().filter(|a| names.contains(&a.category)).collect())
    }
}
