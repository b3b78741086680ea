use std::sync::Arc;
use std::time::Duration;

use nf_core::{Result, SentimentClassifier, Summarizer};
use serde::{Deserialize, Serialize};

pub mod classifier;
pub mod memo;
pub mod models;
pub mod parse;
pub mod prompts;
pub mod summarizer;

pub use classifier::LlmSentimentClassifier;
pub use memo::{Memoized, MemoizedClassifier, MemoizedSummarizer};
pub use models::{create_model, ChatModel};
pub use parse::{parse_sentiment_or_unknown, parse_sentiment_output};
pub use summarizer::LlmSummarizer;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `openai` for any OpenAI-compatible endpoint, `dummy` for offline heuristics.
    pub provider: String,
    pub api_key: Option<String>,
    pub model_name: String,
    pub base_url: String,
    pub sentiment_temperature: f32,
    pub summary_temperature: f32,
    pub timeout_secs: u64,
    /// How many articles of one run are enriched at the same time.
    pub concurrency: usize,
    /// How long successful answers are remembered. Zero disables memoization.
    pub memo_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            api_key: None,
            model_name: "gpt-4o-mini".to_string(),
            base_url: models::openai::DEFAULT_BASE_URL.to_string(),
            sentiment_temperature: 0.2,
            summary_temperature: 0.3,
            timeout_secs: 30,
            concurrency: 4,
            memo_ttl_secs: 3600,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// The two enrichment capabilities the pipeline consumes.
#[derive(Clone)]
pub struct Enrichers {
    pub classifier: Arc<dyn SentimentClassifier>,
    pub summarizer: Arc<dyn Summarizer>,
}

/// Build the sentiment classifier and summarizer described by `config`.
pub fn build_enrichers(config: &Config) -> Result<Enrichers> {
    let memo_ttl = Duration::from_secs(config.memo_ttl_secs);

    if config.provider.eq_ignore_ascii_case("dummy") {
        let model = Arc::new(models::dummy::DummyModel::new());
        return Ok(Enrichers {
            classifier: model.clone(),
            summarizer: model,
        });
    }

    let model = create_model(config)?;
    let classifier = LlmSentimentClassifier::new(model.clone(), config.sentiment_temperature, config.timeout());
    let summarizer = LlmSummarizer::new(model, config.summary_temperature, config.timeout());

    if memo_ttl.is_zero() {
        return Ok(Enrichers {
            classifier: Arc::new(classifier),
            summarizer: Arc::new(summarizer),
        });
    }

    Ok(Enrichers {
        classifier: Arc::new(MemoizedClassifier::new(classifier, memo_ttl)),
        summarizer: Arc::new(MemoizedSummarizer::new(summarizer, memo_ttl)),
    })
}

pub mod prelude {
    pub use super::{build_enrichers, Config, Enrichers};
    pub use nf_core::{Error, Result, Sentiment, SentimentClassifier, Summarizer};
}
