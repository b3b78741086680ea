use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nf_core::{
    Article, ArticleStore, BookmarkStore, CategoryFilter, Error, Interest, InterestStore, NewArticle,
    ProcessingStatus, Result, UserId,
};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    articles: Vec<Article>,
    by_url: HashMap<String, usize>,
    interests: Vec<Interest>,
    user_interests: HashMap<UserId, BTreeSet<i64>>,
    /// Per user, oldest bookmark first.
    bookmarks: HashMap<UserId, Vec<i64>>,
}

impl MemoryState {
    fn next_article_id(&self) -> i64 {
        self.articles.len() as i64 + 1
    }

    fn upsert(&mut self, incoming: &NewArticle, now: DateTime<Utc>) {
        if let Some(&index) = self.by_url.get(&incoming.url) {
            merge(&mut self.articles[index], incoming, now);
            return;
        }

        let article = Article {
            id: self.next_article_id(),
            url: incoming.url.clone(),
            title: incoming.title.clone(),
            summary: incoming.summary.clone(),
            image_url: incoming.image_url.clone(),
            published_at: incoming.published_at,
            source: incoming.source.clone(),
            category: incoming.category.clone(),
            sentiment: incoming.sentiment,
            processing_status: incoming.processing_status,
            updated_at: now,
        };
        self.by_url.insert(article.url.clone(), self.articles.len());
        self.articles.push(article);
    }

    fn article(&self, id: i64) -> Option<&Article> {
        // ids are dense and start at 1
        usize::try_from(id - 1).ok().and_then(|index| self.articles.get(index))
    }
}

/// Apply an incoming row to an existing one.
///
/// Raw fields always follow the newest observation. Enrichment only moves
/// forward: a completed row keeps its summary, sentiment and status unless
/// the incoming row is itself completed.
fn merge(existing: &mut Article, incoming: &NewArticle, now: DateTime<Utc>) {
    existing.title = incoming.title.clone();
    existing.image_url = incoming.image_url.clone();
    existing.published_at = incoming.published_at;
    existing.source = incoming.source.clone();
    existing.category = incoming.category.clone();
    existing.updated_at = now;

    let keep_enrichment = existing.processing_status == ProcessingStatus::Completed
        && incoming.processing_status != ProcessingStatus::Completed;
    if !keep_enrichment {
        existing.summary = incoming.summary.clone();
        existing.sentiment = incoming.sentiment;
        existing.processing_status = incoming.processing_status;
    }
}

/// In-process store. Everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn article_count(&self) -> usize {
        self.state.read().await.articles.len()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn upsert_many(&self, articles: &[NewArticle]) -> Result<usize> {
        // Validate first so a bad row leaves the store untouched.
        if let Some(bad) = articles.iter().find(|a| a.url.trim().is_empty()) {
            return Err(Error::Storage(format!("article {:?} has no url", bad.title)));
        }

        let now = Utc::now();
        let mut state = self.state.write().await;
        for article in articles {
            state.upsert(article, now);
        }
        tracing::debug!(count = articles.len(), "upserted articles into memory store");
        Ok(articles.len())
    }

    async fn query_by_status_and_category(
        &self,
        status: ProcessingStatus,
        category: &CategoryFilter,
    ) -> Result<Vec<Article>> {
        let state = self.state.read().await;
        let mut found: Vec<Article> = state
            .articles
            .iter()
            .filter(|a| a.processing_status == status && category.matches(&a.category))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(found)
    }

    async fn mark_status(&self, urls: &[String], status: ProcessingStatus) -> Result<usize> {
        let now = Utc::now();
        let mut state = self.state.write().await;
        let mut updated = 0;
        for url in urls {
            if let Some(&index) = state.by_url.get(url) {
                let article = &mut state.articles[index];
                article.processing_status = status;
                article.updated_at = now;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn get_article(&self, id: i64) -> Result<Option<Article>> {
        Ok(self.state.read().await.article(id).cloned())
    }
}

#[async_trait]
impl InterestStore for MemoryStore {
    async fn list_interests(&self) -> Result<Vec<Interest>> {
        Ok(self.state.read().await.interests.clone())
    }

    async fn seed_interests(&self, names: &[&str]) -> Result<usize> {
        let mut state = self.state.write().await;
        let mut added = 0;
        for name in names {
            if state.interests.iter().any(|i| i.name == *name) {
                continue;
            }
            let id = state.interests.len() as i64 + 1;
            state.interests.push(Interest {
                id,
                name: name.to_string(),
            });
            added += 1;
        }
        Ok(added)
    }

    async fn set_user_interests(&self, user: UserId, interest_ids: &[i64]) -> Result<Vec<Interest>> {
        let mut state = self.state.write().await;
        let known: BTreeSet<i64> = interest_ids
            .iter()
            .copied()
            .filter(|id| state.interests.iter().any(|i| i.id == *id))
            .collect();
        let selected = state
            .interests
            .iter()
            .filter(|i| known.contains(&i.id))
            .cloned()
            .collect();
        state.user_interests.insert(user, known);
        Ok(selected)
    }

    async fn user_interests(&self, user: UserId) -> Result<Vec<Interest>> {
        let state = self.state.read().await;
        let Some(ids) = state.user_interests.get(&user) else {
            return Ok(Vec::new());
        };
        Ok(state.interests.iter().filter(|i| ids.contains(&i.id)).cloned().collect())
    }
}

#[async_trait]
impl BookmarkStore for MemoryStore {
    async fn add_bookmark(&self, user: UserId, article_id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        if state.article(article_id).is_none() {
            return Err(Error::NotFound(format!("article {article_id}")));
        }
        let marks = state.bookmarks.entry(user).or_default();
        if !marks.contains(&article_id) {
            marks.push(article_id);
        }
        Ok(())
    }

    async fn remove_bookmark(&self, user: UserId, article_id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        let Some(marks) = state.bookmarks.get_mut(&user) else {
            return Ok(false);
        };
        let before = marks.len();
        marks.retain(|id| *id != article_id);
        Ok(marks.len() != before)
    }

    async fn bookmarks(&self, user: UserId) -> Result<Vec<Article>> {
        let state = self.state.read().await;
        let Some(marks) = state.bookmarks.get(&user) else {
            return Ok(Vec::new());
        };
        Ok(marks.iter().rev().filter_map(|id| state.article(*id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nf_core::Sentiment;

    fn row(url: &str, category: &str, status: ProcessingStatus, hour: u32) -> NewArticle {
        NewArticle {
            url: url.to_string(),
            title: format!("title of {url}"),
            summary: if status == ProcessingStatus::Completed {
                "a summary".to_string()
            } else {
                String::new()
            },
            image_url: None,
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            source: "test".to_string(),
            category: category.to_string(),
            sentiment: if status == ProcessingStatus::Completed {
                Sentiment::Positive
            } else {
                Sentiment::Unknown
            },
            processing_status: status,
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_on_url() {
        let store = MemoryStore::new();
        let batch = vec![
            row("https://a", "technology", ProcessingStatus::Completed, 1),
            row("https://b", "technology", ProcessingStatus::Completed, 2),
        ];

        store.upsert_many(&batch).await.unwrap();
        store.upsert_many(&batch).await.unwrap();
        assert_eq!(store.article_count().await, 2);
    }

    #[tokio::test]
    async fn test_query_filters_and_orders_newest_first() {
        let store = MemoryStore::new();
        store
            .upsert_many(&[
                row("https://old", "technology", ProcessingStatus::Completed, 1),
                row("https://new", "technology", ProcessingStatus::Completed, 9),
                row("https://pending", "technology", ProcessingStatus::Pending, 5),
                row("https://sport", "sports", ProcessingStatus::Completed, 7),
            ])
            .await
            .unwrap();

        let tech = store
            .query_by_status_and_category(ProcessingStatus::Completed, &CategoryFilter::Named("technology".into()))
            .await
            .unwrap();
        let urls: Vec<&str> = tech.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://new", "https://old"]);

        let all = store
            .query_by_status_and_category(ProcessingStatus::Completed, &CategoryFilter::All)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].url, "https://new");
    }

    #[tokio::test]
    async fn test_pending_never_downgrades_completed() {
        let store = MemoryStore::new();
        store
            .upsert_many(&[row("https://a", "technology", ProcessingStatus::Completed, 1)])
            .await
            .unwrap();

        let mut refreshed = row("https://a", "technology", ProcessingStatus::Pending, 3);
        refreshed.title = "updated headline".to_string();
        store.upsert_many(&[refreshed]).await.unwrap();

        let article = store.get_article(1).await.unwrap().unwrap();
        assert_eq!(article.processing_status, ProcessingStatus::Completed);
        assert_eq!(article.summary, "a summary");
        assert_eq!(article.sentiment, Sentiment::Positive);
        assert_eq!(article.title, "updated headline");
    }

    #[tokio::test]
    async fn test_invalid_batch_writes_nothing() {
        let store = MemoryStore::new();
        let result = store
            .upsert_many(&[
                row("https://a", "technology", ProcessingStatus::Completed, 1),
                row("   ", "technology", ProcessingStatus::Completed, 2),
            ])
            .await;

        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(store.article_count().await, 0);
    }

    #[tokio::test]
    async fn test_mark_status() {
        let store = MemoryStore::new();
        store
            .upsert_many(&[row("https://a", "science", ProcessingStatus::Pending, 1)])
            .await
            .unwrap();

        let updated = store
            .mark_status(&["https://a".to_string(), "https://missing".to_string()], ProcessingStatus::Failed)
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let failed = store
            .query_by_status_and_category(ProcessingStatus::Failed, &CategoryFilter::All)
            .await
            .unwrap();
        assert_eq!(failed.len(), 1);
    }

    #[tokio::test]
    async fn test_user_interests_ignore_unknown_ids() {
        let store = MemoryStore::new();
        store.seed_interests(&["Politics", "Science", "Sports"]).await.unwrap();

        let chosen = store.set_user_interests(7, &[3, 1, 42]).await.unwrap();
        let names: Vec<&str> = chosen.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Politics", "Sports"]);
        assert_eq!(store.user_interests(7).await.unwrap(), chosen);
        assert!(store.user_interests(8).await.unwrap().is_empty());

        store.set_user_interests(7, &[]).await.unwrap();
        assert!(store.user_interests(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bookmarks_newest_first() {
        let store = MemoryStore::new();
        store
            .upsert_many(&[
                row("https://a", "science", ProcessingStatus::Completed, 1),
                row("https://b", "science", ProcessingStatus::Completed, 2),
            ])
            .await
            .unwrap();

        store.add_bookmark(1, 1).await.unwrap();
        store.add_bookmark(1, 2).await.unwrap();
        store.add_bookmark(1, 1).await.unwrap();

        let marks = store.bookmarks(1).await.unwrap();
        let ids: Vec<i64> = marks.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 1]);

        assert!(matches!(store.add_bookmark(1, 99).await, Err(Error::NotFound(_))));
        assert!(store.remove_bookmark(1, 2).await.unwrap());
        assert!(!store.remove_bookmark(1, 2).await.unwrap());
        assert_eq!(store.bookmarks(1).await.unwrap().len(), 1);
    }
}
