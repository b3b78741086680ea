use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nf_core::{Error, Result, Sentiment, Summarizer};

use crate::models::ChatModel;
use crate::prompts::summary_prompt;

/// Summaries backed by a chat model.
#[derive(Debug, Clone)]
pub struct LlmSummarizer {
    model: Arc<dyn ChatModel>,
    temperature: f32,
    timeout: Duration,
}

impl LlmSummarizer {
    pub fn new(model: Arc<dyn ChatModel>, temperature: f32, timeout: Duration) -> Self {
        Self {
            model,
            temperature,
            timeout,
        }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    fn name(&self) -> &str {
        self.model.name()
    }

    async fn summarize(&self, title: &str, description: &str, sentiment: Sentiment) -> Result<String> {
        let prompt = summary_prompt(title, description, sentiment);
        let summary = tokio::time::timeout(self.timeout, self.model.complete(&prompt, self.temperature))
            .await
            .map_err(|_| Error::Summarization(format!("timed out after {:?}", self.timeout)))??;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(Error::Summarization("model returned an empty summary".to_string()));
        }
        tracing::debug!(title, chars = summary.len(), "summary generated");
        Ok(summary.to_string())
    }
}
