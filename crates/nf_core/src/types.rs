use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Pseudo-category selecting every category at once.
pub const ALL_CATEGORIES: &str = "all";

pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    #[default]
    Unknown,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            "unknown" => Ok(Sentiment::Unknown),
            other => Err(Error::Classification(format!("unrecognised sentiment: {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ProcessingStatus::Pending),
            "completed" => Ok(ProcessingStatus::Completed),
            "failed" => Ok(ProcessingStatus::Failed),
            other => Err(Error::Storage(format!("unknown processing status: {other:?}"))),
        }
    }
}

/// Category selector used by store queries and the feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    All,
    Named(String),
}

impl CategoryFilter {
    /// `None`, blank input and `"all"` (any case) select every category.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => CategoryFilter::All,
            Some(s) if s.eq_ignore_ascii_case(ALL_CATEGORIES) => CategoryFilter::All,
            Some(s) => CategoryFilter::Named(s.to_string()),
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => name == category,
        }
    }

    pub fn as_key(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Named(name) => name,
        }
    }
}

/// An article in flight through a pipeline run, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub category: String,
    pub sentiment: Option<Sentiment>,
    pub summary: Option<String>,
    /// Per-article failures recorded by the enrichment stages.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ArticleDraft {
    pub fn new(url: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            url: url.into(),
            image_url: None,
            published_at: Utc::now(),
            source: String::new(),
            category: category.into(),
            sentiment: None,
            summary: None,
            errors: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn note_error(&mut self, note: impl Into<String>) {
        self.errors.push(note.into());
    }

    /// Persisted status for this draft once both enrichment stages have run.
    pub fn processing_status(&self) -> ProcessingStatus {
        if self.errors.is_empty() && self.sentiment.is_some() && self.summary.is_some() {
            ProcessingStatus::Completed
        } else {
            ProcessingStatus::Failed
        }
    }

    /// Record written by the pipeline after enrichment.
    pub fn to_enriched(&self) -> NewArticle {
        NewArticle {
            url: self.url.clone(),
            title: self.title.clone(),
            summary: self.summary.clone().unwrap_or_default(),
            image_url: self.image_url.clone(),
            published_at: self.published_at,
            source: self.source.clone(),
            category: self.category.clone(),
            sentiment: self.sentiment.unwrap_or_default(),
            processing_status: self.processing_status(),
        }
    }

    /// Record written by raw ingestion, before any enrichment.
    pub fn to_pending(&self) -> NewArticle {
        NewArticle {
            url: self.url.clone(),
            title: self.title.clone(),
            summary: String::new(),
            image_url: self.image_url.clone(),
            published_at: self.published_at,
            source: self.source.clone(),
            category: self.category.clone(),
            sentiment: Sentiment::Unknown,
            processing_status: ProcessingStatus::Pending,
        }
    }
}

/// Insert-or-merge payload for the article store, keyed by `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub category: String,
    pub sentiment: Sentiment,
    pub processing_status: ProcessingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub category: String,
    pub sentiment: Sentiment,
    pub processing_status: ProcessingStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interest {
    pub id: i64,
    pub name: String,
}
