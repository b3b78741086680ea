use std::sync::Arc;

use nf_core::{BookmarkStore, IdentityResolver, InterestStore};
use nf_pipeline::NewsService;

pub struct AppState {
    pub news: NewsService,
    pub interests: Arc<dyn InterestStore>,
    pub bookmarks: Arc<dyn BookmarkStore>,
    pub identity: Arc<dyn IdentityResolver>,
}
