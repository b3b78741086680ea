use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nf_core::{Error, Result, Sentiment, SentimentClassifier};

use crate::models::ChatModel;
use crate::parse::parse_sentiment_output;
use crate::prompts::sentiment_prompt;

/// Sentiment classification backed by a chat model.
#[derive(Debug, Clone)]
pub struct LlmSentimentClassifier {
    model: Arc<dyn ChatModel>,
    temperature: f32,
    timeout: Duration,
}

impl LlmSentimentClassifier {
    pub fn new(model: Arc<dyn ChatModel>, temperature: f32, timeout: Duration) -> Self {
        Self {
            model,
            temperature,
            timeout,
        }
    }
}

#[async_trait]
impl SentimentClassifier for LlmSentimentClassifier {
    fn name(&self) -> &str {
        self.model.name()
    }

    async fn classify(&self, title: &str, description: &str) -> Result<Sentiment> {
        let prompt = sentiment_prompt(title, description);
        let raw = tokio::time::timeout(self.timeout, self.model.complete(&prompt, self.temperature))
            .await
            .map_err(|_| Error::Classification(format!("timed out after {:?}", self.timeout)))??;

        parse_sentiment_output(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct CannedModel(&'static str);

    #[async_trait]
    impl ChatModel for CannedModel {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Debug)]
    struct StalledModel;

    #[async_trait]
    impl ChatModel for StalledModel {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("positive".to_string())
        }
    }

    #[tokio::test]
    async fn test_classifier_parses_wrapped_output() {
        let classifier = LlmSentimentClassifier::new(
            Arc::new(CannedModel("```json\n{\"sentiment\": \"negative\"}\n```")),
            0.2,
            Duration::from_secs(1),
        );
        assert_eq!(classifier.classify("t", "d").await.unwrap(), Sentiment::Negative);
    }

    #[tokio::test]
    async fn test_classifier_rejects_garbage() {
        let classifier = LlmSentimentClassifier::new(Arc::new(CannedModel("not json")), 0.2, Duration::from_secs(1));
        assert!(matches!(classifier.classify("t", "d").await, Err(Error::Classification(_))));
    }

    #[tokio::test]
    async fn test_classifier_times_out() {
        let classifier = LlmSentimentClassifier::new(Arc::new(StalledModel), 0.2, Duration::from_millis(20));
        assert!(classifier.classify("t", "d").await.is_err());
    }
}
