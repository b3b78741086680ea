use chrono::{DateTime, Utc};
use nf_core::ArticleDraft;
use serde::Serialize;

/// Position of a run in the fixed stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Retrieving,
    AnalyzingSentiment,
    Summarizing,
    Persisting,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

/// The record a single run threads through its stages.
///
/// Stages take it by value and hand it back, so a run owns its state
/// outright and nothing is shared between runs. Once `status` is
/// `Failed` the orchestrator stops calling stages.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRunState {
    pub category: String,
    pub articles: Vec<ArticleDraft>,
    pub status: RunStatus,
    pub stage: PipelineStage,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub saved_count: usize,
}

impl PipelineRunState {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            articles: Vec::new(),
            status: RunStatus::Success,
            stage: PipelineStage::Retrieving,
            error: None,
            timestamp: Utc::now(),
            saved_count: 0,
        }
    }

    pub fn advance(mut self, stage: PipelineStage) -> Self {
        if self.is_failed() {
            return self;
        }
        self.stage = stage;
        self.timestamp = Utc::now();
        self
    }

    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = RunStatus::Failed;
        self.stage = PipelineStage::Failed;
        self.error = Some(error.into());
        self.timestamp = Utc::now();
        self
    }

    pub fn is_failed(&self) -> bool {
        self.status == RunStatus::Failed
    }

    pub fn is_done(&self) -> bool {
        self.stage == PipelineStage::Done
    }
}
