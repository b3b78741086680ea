pub mod cache;
pub mod error;
pub mod identity;
pub mod models;
pub mod sources;
pub mod storage;
pub mod types;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use error::{Error, Result};
pub use identity::IdentityResolver;
pub use models::{SentimentClassifier, Summarizer};
pub use sources::NewsSource;
pub use storage::{ArticleStore, BookmarkStore, InterestStore};
pub use types::{
    Article, ArticleDraft, CategoryFilter, Interest, NewArticle, ProcessingStatus, Sentiment,
    UserId, ALL_CATEGORIES,
};
