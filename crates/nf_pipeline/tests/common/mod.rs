#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use nf_core::{
    Article, ArticleDraft, ArticleStore, CategoryFilter, Error, NewArticle, NewsSource, ProcessingStatus, Result,
    Sentiment, SentimentClassifier, Summarizer,
};
use nf_pipeline::Pipeline;
use nf_storage::MemoryStore;

pub fn draft(url: &str, category: &str, hour: u32) -> ArticleDraft {
    ArticleDraft::new(url, format!("Headline {url}"), category)
        .with_description(format!("Description of {url}"))
        .with_published_at(Utc.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap())
}

/// Returns the same drafts for any category, relabelled with that category.
pub struct StaticSource {
    name: String,
    drafts: Vec<ArticleDraft>,
    pub calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(name: &str, drafts: Vec<ArticleDraft>) -> Self {
        Self {
            name: name.to_string(),
            drafts,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, category: &str) -> Result<Vec<ArticleDraft>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .drafts
            .iter()
            .cloned()
            .map(|mut d| {
                d.category = category.to_string();
                d.source = self.name.clone();
                d
            })
            .collect())
    }
}

/// Returns drafts only for the categories it was given.
pub struct CategorySource {
    entries: Vec<ArticleDraft>,
    pub calls: AtomicUsize,
}

impl CategorySource {
    pub fn new(entries: Vec<ArticleDraft>) -> Self {
        Self {
            entries,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl NewsSource for CategorySource {
    fn name(&self) -> &str {
        "by-category"
    }

    async fn fetch(&self, category: &str) -> Result<Vec<ArticleDraft>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.iter().filter(|d| d.category == category).cloned().collect())
    }
}

pub struct FixedClassifier {
    sentiment: Sentiment,
    pub calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(sentiment: Sentiment) -> Self {
        Self {
            sentiment,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SentimentClassifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn classify(&self, _title: &str, _description: &str) -> Result<Sentiment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.sentiment)
    }
}

/// Summary is the title; later articles answer faster to shuffle completion order.
pub struct TitleSummarizer {
    pub calls: AtomicUsize,
    fail_on: Option<String>,
}

impl TitleSummarizer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on: None,
        }
    }

    pub fn failing_on(url_fragment: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on: Some(url_fragment.to_string()),
        }
    }
}

#[async_trait]
impl Summarizer for TitleSummarizer {
    fn name(&self) -> &str {
        "title"
    }

    async fn summarize(&self, title: &str, _description: &str, sentiment: Sentiment) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
        tokio::time::sleep(Duration::from_millis(30u64.saturating_sub(call * 10))).await;
        if self.fail_on.as_deref().is_some_and(|fragment| title.contains(fragment)) {
            return Err(Error::Summarization("model unavailable".to_string()));
        }
        Ok(format!("{title} [{sentiment}]"))
    }
}

/// Rejects every write and counts the attempts.
#[derive(Default)]
pub struct BrokenStore {
    pub upserts: AtomicUsize,
}

#[async_trait]
impl ArticleStore for BrokenStore {
    async fn upsert_many(&self, _articles: &[NewArticle]) -> Result<usize> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Err(Error::Storage("database is locked".to_string()))
    }

    async fn query_by_status_and_category(
        &self,
        _status: ProcessingStatus,
        _category: &CategoryFilter,
    ) -> Result<Vec<Article>> {
        Ok(Vec::new())
    }

    async fn mark_status(&self, _urls: &[String], _status: ProcessingStatus) -> Result<usize> {
        Ok(0)
    }

    async fn get_article(&self, _id: i64) -> Result<Option<Article>> {
        Ok(None)
    }
}

pub struct Harness {
    pub source: Arc<StaticSource>,
    pub classifier: Arc<FixedClassifier>,
    pub summarizer: Arc<TitleSummarizer>,
    pub store: Arc<MemoryStore>,
    pub pipeline: Pipeline,
}

pub fn harness(drafts: Vec<ArticleDraft>) -> Harness {
    let source = Arc::new(StaticSource::new("stub", drafts));
    let classifier = Arc::new(FixedClassifier::new(Sentiment::Neutral));
    let summarizer = Arc::new(TitleSummarizer::new());
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(source.clone(), classifier.clone(), summarizer.clone(), store.clone());
    Harness {
        source,
        classifier,
        summarizer,
        store,
        pipeline,
    }
}
