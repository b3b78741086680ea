use async_trait::async_trait;

use crate::types::Sentiment;
use crate::Result;

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Classify the tone of an article from its title and description.
    async fn classify(&self, title: &str, description: &str) -> Result<Sentiment>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    /// Produce a short prose summary of an article.
    async fn summarize(&self, title: &str, description: &str, sentiment: Sentiment) -> Result<String>;
}
