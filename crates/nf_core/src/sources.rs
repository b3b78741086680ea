use async_trait::async_trait;

use crate::types::ArticleDraft;
use crate::Result;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Provider name, stored as the `source` of articles without one.
    fn name(&self) -> &str;

    /// Fetch recent articles for a category.
    async fn fetch(&self, category: &str) -> Result<Vec<ArticleDraft>>;
}
