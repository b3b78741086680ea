use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nf_core::{Clock, Result, Sentiment, SentimentClassifier, Summarizer, TtlCache};
use sha2::{Digest, Sha256};

/// Remembers successful answers of an expensive enricher for a while.
///
/// Keys are SHA-256 digests of the inputs, so re-running the pipeline over
/// the same upstream articles within the TTL does not call the model again.
/// Errors pass through and are never stored.
pub struct Memoized<C, V> {
    inner: C,
    cache: TtlCache<String, V>,
    _value: PhantomData<fn() -> V>,
}

pub type MemoizedClassifier<C> = Memoized<C, Sentiment>;
pub type MemoizedSummarizer<C> = Memoized<C, String>;

impl<C, V: Clone> Memoized<C, V> {
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
            _value: PhantomData,
        }
    }

    pub fn with_clock(inner: C, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            cache: TtlCache::with_clock(ttl, clock),
            _value: PhantomData,
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

impl<C, V> fmt::Debug for Memoized<C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized").field("cache", &self.cache).finish()
    }
}

fn digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

#[async_trait]
impl<C: SentimentClassifier> SentimentClassifier for Memoized<C, Sentiment> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn classify(&self, title: &str, description: &str) -> Result<Sentiment> {
        let key = digest(&["sentiment", title, description]);
        if let Some(hit) = self.cache.get(&key) {
            tracing::trace!(%key, "sentiment memo hit");
            return Ok(hit);
        }

        let sentiment = self.inner.classify(title, description).await?;
        self.cache.insert(key, sentiment);
        Ok(sentiment)
    }
}

#[async_trait]
impl<C: Summarizer> Summarizer for Memoized<C, String> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn summarize(&self, title: &str, description: &str, sentiment: Sentiment) -> Result<String> {
        let key = digest(&["summary", title, description, sentiment.as_str()]);
        if let Some(hit) = self.cache.get(&key) {
            tracing::trace!(%key, "summary memo hit");
            return Ok(hit);
        }

        let summary = self.inner.summarize(title, description, sentiment).await?;
        self.cache.insert(key, summary.clone());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::{Error, ManualClock};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingClassifier {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SentimentClassifier for CountingClassifier {
        fn name(&self) -> &str {
            "counting"
        }

        async fn classify(&self, _title: &str, _description: &str) -> Result<Sentiment> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Classification("boom".to_string()));
            }
            Ok(Sentiment::Positive)
        }
    }

    #[derive(Default)]
    struct CountingSummarizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Summarizer for CountingSummarizer {
        fn name(&self) -> &str {
            "counting"
        }

        async fn summarize(&self, title: &str, _description: &str, sentiment: Sentiment) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{title} ({sentiment})"))
        }
    }

    #[tokio::test]
    async fn test_repeat_classification_hits_memo() {
        let memo = MemoizedClassifier::new(CountingClassifier::default(), Duration::from_secs(3600));

        assert_eq!(memo.classify("a", "b").await.unwrap(), Sentiment::Positive);
        assert_eq!(memo.classify("a", "b").await.unwrap(), Sentiment::Positive);
        assert_eq!(memo.inner.calls.load(Ordering::SeqCst), 1);

        memo.classify("a", "other").await.unwrap();
        assert_eq!(memo.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(memo.cached_entries(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_memoized() {
        let memo = MemoizedClassifier::new(
            CountingClassifier {
                fail: true,
                ..Default::default()
            },
            Duration::from_secs(3600),
        );

        assert!(memo.classify("a", "b").await.is_err());
        assert!(memo.classify("a", "b").await.is_err());
        assert_eq!(memo.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(memo.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_summary_memo_expires() {
        let clock = Arc::new(ManualClock::new());
        let memo = MemoizedSummarizer::with_clock(CountingSummarizer::default(), Duration::from_secs(3600), clock.clone());

        assert_eq!(memo.summarize("t", "d", Sentiment::Neutral).await.unwrap(), "t (neutral)");
        memo.summarize("t", "d", Sentiment::Neutral).await.unwrap();
        assert_eq!(memo.inner.calls.load(Ordering::SeqCst), 1);

        // A different tone is a different prompt.
        memo.summarize("t", "d", Sentiment::Negative).await.unwrap();
        assert_eq!(memo.inner.calls.load(Ordering::SeqCst), 2);

        clock.advance(Duration::from_secs(3601));
        memo.summarize("t", "d", Sentiment::Neutral).await.unwrap();
        assert_eq!(memo.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_memo_size_tracks_live_entries_across_batches() {
        let clock = Arc::new(ManualClock::new());
        let memo = MemoizedClassifier::with_clock(CountingClassifier::default(), Duration::from_secs(3600), clock.clone());

        for batch in 0..24 {
            for article in 0..100 {
                memo.classify(&format!("title {batch}-{article}"), "body").await.unwrap();
            }
            assert!(memo.cached_entries() <= 100, "batch {batch}: {} entries", memo.cached_entries());
            clock.advance(Duration::from_secs(3601));
        }
        assert_eq!(memo.inner.calls.load(Ordering::SeqCst), 2400);
    }
}
