use async_trait::async_trait;

use crate::types::{Article, CategoryFilter, Interest, NewArticle, ProcessingStatus, UserId};
use crate::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert or merge articles on `url`. The whole batch commits or none of it does.
    async fn upsert_many(&self, articles: &[NewArticle]) -> Result<usize>;

    /// Articles with the given status, newest `published_at` first.
    async fn query_by_status_and_category(
        &self,
        status: ProcessingStatus,
        category: &CategoryFilter,
    ) -> Result<Vec<Article>>;

    /// Set the processing status of the articles with these urls.
    async fn mark_status(&self, urls: &[String], status: ProcessingStatus) -> Result<usize>;

    async fn get_article(&self, id: i64) -> Result<Option<Article>>;
}

#[async_trait]
pub trait InterestStore: Send + Sync {
    async fn list_interests(&self) -> Result<Vec<Interest>>;

    /// Add any missing names to the catalog. Returns how many were new.
    async fn seed_interests(&self, names: &[&str]) -> Result<usize>;

    /// Replace a user's interests. Unknown ids are ignored.
    async fn set_user_interests(&self, user: UserId, interest_ids: &[i64]) -> Result<Vec<Interest>>;

    async fn user_interests(&self, user: UserId) -> Result<Vec<Interest>>;
}

#[async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn add_bookmark(&self, user: UserId, article_id: i64) -> Result<()>;

    /// Returns whether a bookmark was removed.
    async fn remove_bookmark(&self, user: UserId, article_id: i64) -> Result<bool>;

    /// Bookmarked articles, most recently bookmarked first.
    async fn bookmarks(&self, user: UserId) -> Result<Vec<Article>>;
}
