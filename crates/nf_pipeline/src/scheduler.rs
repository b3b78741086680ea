use std::sync::Arc;
use std::time::Duration;

use nf_core::{ArticleDraft, ArticleStore, InterestStore, NewArticle, NewsSource, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_AGGREGATION_INTERVAL: Duration = Duration::from_secs(3600);

/// Periodically pulls every catalog category and stores the raw articles as pending.
#[derive(Clone)]
pub struct AggregationScheduler {
    source: Arc<dyn NewsSource>,
    articles: Arc<dyn ArticleStore>,
    interests: Arc<dyn InterestStore>,
    interval: Duration,
}

/// Stops the background loop when asked or dropped.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "aggregation task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl AggregationScheduler {
    pub fn new(source: Arc<dyn NewsSource>, articles: Arc<dyn ArticleStore>, interests: Arc<dyn InterestStore>) -> Self {
        Self {
            source,
            articles,
            interests,
            interval: DEFAULT_AGGREGATION_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// One pass over the catalog. Returns how many rows were written.
    pub async fn run_once(&self) -> Result<usize> {
        let interests = self.interests.list_interests().await?;
        let mut written = 0;

        for interest in &interests {
            let drafts = match self.source.fetch(&interest.name).await {
                Ok(drafts) => drafts,
                Err(e) => {
                    tracing::warn!(category = %interest.name, error = %e, "aggregation fetch failed");
                    continue;
                }
            };
            if drafts.is_empty() {
                continue;
            }

            let rows: Vec<NewArticle> = drafts.iter().map(ArticleDraft::to_pending).collect();
            match self.articles.upsert_many(&rows).await {
                Ok(count) => {
                    tracing::info!(category = %interest.name, count, "news aggregated");
                    written += count;
                }
                Err(e) => tracing::error!(category = %interest.name, error = %e, "storing aggregated news failed"),
            }
        }

        Ok(written)
    }

    /// Start the loop on the runtime. The first pass runs immediately.
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown, mut stop) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // A pass in flight is abandoned on shutdown; rows it already wrote stay.
                        tokio::select! {
                            result = self.run_once() => {
                                if let Err(e) = result {
                                    tracing::error!(error = %e, "aggregation pass failed");
                                }
                            }
                            changed = stop.changed() => {
                                if changed.is_err() || *stop.borrow() {
                                    break;
                                }
                            }
                        }
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!("aggregation scheduler stopped");
        });

        SchedulerHandle { shutdown, task }
    }
}
