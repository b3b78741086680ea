use std::path::PathBuf;
use std::sync::Arc;

use nf_core::{ArticleStore, BookmarkStore, Error, InterestStore, Result};
use serde::{Deserialize, Serialize};

pub mod backends;

pub use backends::*;

/// Interest catalog every fresh store starts with.
pub const DEFAULT_INTERESTS: &[&str] = &[
    "World News",
    "Politics",
    "Business",
    "Technology",
    "Science",
    "Health",
    "Sports",
    "Entertainment",
    "Environment",
    "Education",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `memory` or `sqlite`.
    pub backend: String,
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            path: PathBuf::from("news.db"),
        }
    }
}

/// The three store capabilities, typically all served by one backend.
#[derive(Clone)]
pub struct StoreHandles {
    pub articles: Arc<dyn ArticleStore>,
    pub interests: Arc<dyn InterestStore>,
    pub bookmarks: Arc<dyn BookmarkStore>,
}

impl StoreHandles {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ArticleStore + InterestStore + BookmarkStore + 'static,
    {
        Self {
            articles: store.clone(),
            interests: store.clone(),
            bookmarks: store,
        }
    }
}

pub async fn create_store(config: &StorageConfig) -> Result<StoreHandles> {
    match config.backend.to_ascii_lowercase().as_str() {
        "memory" => Ok(StoreHandles::from_store(Arc::new(MemoryStore::new()))),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let store = SqliteStore::new_with_path(&config.path).await?;
            Ok(StoreHandles::from_store(Arc::new(store)))
        }
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(Error::Config(
            "sqlite storage requested but nf_storage was built without the `sqlite` feature".to_string(),
        )),
        other => Err(Error::Config(format!("unknown storage backend: {other}"))),
    }
}

/// Make sure the default catalog exists. Safe to call on every start.
pub async fn seed_default_interests(store: &dyn InterestStore) -> Result<usize> {
    let added = store.seed_interests(DEFAULT_INTERESTS).await?;
    if added > 0 {
        tracing::info!(added, "seeded interest catalog");
    }
    Ok(added)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_store, seed_default_interests, StorageConfig, StoreHandles, DEFAULT_INTERESTS};
}
