use std::fmt;

use async_trait::async_trait;
use nf_core::{Result, Sentiment, SentimentClassifier, Summarizer};

const POSITIVE_WORDS: &[&str] = &[
    "gain", "gains", "growth", "win", "wins", "record", "success", "improve", "improves", "breakthrough", "rise",
    "rises", "surge", "hope",
];

const NEGATIVE_WORDS: &[&str] = &[
    "loss", "losses", "crash", "war", "dies", "dead", "death", "crisis", "fall", "falls", "decline", "fraud",
    "attack", "fear",
];

const SUMMARY_WORDS: usize = 20;

/// Offline stand-in for the LLM: keyword tone and a leading-words summary.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

fn score(text: &str) -> i32 {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let word = word.to_lowercase();
            if POSITIVE_WORDS.contains(&word.as_str()) {
                1
            } else if NEGATIVE_WORDS.contains(&word.as_str()) {
                -1
            } else {
                0
            }
        })
        .sum()
}

#[async_trait]
impl SentimentClassifier for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn classify(&self, title: &str, description: &str) -> Result<Sentiment> {
        let total = score(title) + score(description);
        Ok(match total.signum() {
            1 => Sentiment::Positive,
            -1 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        })
    }
}

#[async_trait]
impl Summarizer for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize(&self, title: &str, description: &str, _sentiment: Sentiment) -> Result<String> {
        let text = if description.trim().is_empty() { title } else { description };
        let words: Vec<&str> = text.split_whitespace().take(SUMMARY_WORDS).collect();
        Ok(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_model() {
        let model = DummyModel::new();

        let sentiment = model
            .classify("Markets surge to record high", "Investors cheer strong growth.")
            .await
            .unwrap();
        assert_eq!(sentiment, Sentiment::Positive);

        let sentiment = model.classify("Factory fire", "Three dead after the crash.").await.unwrap();
        assert_eq!(sentiment, Sentiment::Negative);

        let sentiment = model.classify("Council meets on Tuesday", "").await.unwrap();
        assert_eq!(sentiment, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn test_dummy_summary_falls_back_to_title() {
        let model = DummyModel::new();

        let summary = model.summarize("Title only", "  ", Sentiment::Neutral).await.unwrap();
        assert_eq!(summary, "Title only");

        let long = "word ".repeat(50);
        let summary = model.summarize("t", &long, Sentiment::Neutral).await.unwrap();
        assert_eq!(summary.split_whitespace().count(), SUMMARY_WORDS);
    }
}
