use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use nf_core::{
    Article, ArticleStore, BookmarkStore, CategoryFilter, Error, Interest, InterestStore, NewArticle,
    ProcessingStatus, Result, Sentiment, UserId,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        url TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        summary TEXT NOT NULL DEFAULT '',
        image_url TEXT,
        published_at TEXT NOT NULL,
        source TEXT NOT NULL,
        category TEXT NOT NULL,
        sentiment TEXT NOT NULL DEFAULT 'unknown',
        processing_status TEXT NOT NULL DEFAULT 'pending',
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_category_status ON articles (category, processing_status)",
    "CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles (published_at)",
    r#"
    CREATE TABLE IF NOT EXISTS interests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_interests (
        user_id INTEGER NOT NULL,
        interest_id INTEGER NOT NULL REFERENCES interests (id),
        PRIMARY KEY (user_id, interest_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bookmarks (
        user_id INTEGER NOT NULL,
        article_id INTEGER NOT NULL REFERENCES articles (id),
        created_at TEXT NOT NULL,
        PRIMARY KEY (user_id, article_id)
    )
    "#,
];

// A non-completed row never overwrites the enrichment of a completed one.
const UPSERT_ARTICLE: &str = r#"
    INSERT INTO articles
    (url, title, summary, image_url, published_at, source, category, sentiment, processing_status, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT (url) DO UPDATE SET
        title = excluded.title,
        image_url = excluded.image_url,
        published_at = excluded.published_at,
        source = excluded.source,
        category = excluded.category,
        updated_at = excluded.updated_at,
        summary = CASE
            WHEN articles.processing_status = 'completed' AND excluded.processing_status <> 'completed'
            THEN articles.summary ELSE excluded.summary END,
        sentiment = CASE
            WHEN articles.processing_status = 'completed' AND excluded.processing_status <> 'completed'
            THEN articles.sentiment ELSE excluded.sentiment END,
        processing_status = CASE
            WHEN articles.processing_status = 'completed' AND excluded.processing_status <> 'completed'
            THEN articles.processing_status ELSE excluded.processing_status END
"#;

fn timestamp(at: DateTime<Utc>) -> String {
    // Fixed-width so lexical order is chronological order.
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn storage_error(context: &str) -> impl Fn(sqlx::Error) -> Error + '_ {
    move |e| Error::Storage(format!("{context}: {e}"))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("Failed to parse date {raw:?}: {e}")))
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    Ok(Article {
        id: row.get("id"),
        url: row.get("url"),
        title: row.get("title"),
        summary: row.get("summary"),
        image_url: row.get("image_url"),
        published_at: parse_timestamp(&row.get::<String, _>("published_at"))?,
        source: row.get("source"),
        category: row.get("category"),
        sentiment: Sentiment::from_str(&row.get::<String, _>("sentiment")).unwrap_or_default(),
        processing_status: ProcessingStatus::from_str(&row.get::<String, _>("processing_status"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}

pub struct SqliteStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteStore {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(storage_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {i}: {e}")))?;
        }

        tracing::info!(path = %db_path.display(), "opened sqlite store");
        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn interests_for(&self, user: UserId) -> Result<Vec<Interest>> {
        let rows = sqlx::query(
            r#"
            SELECT i.id, i.name FROM interests i
            JOIN user_interests ui ON ui.interest_id = i.id
            WHERE ui.user_id = ?
            ORDER BY i.id
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Failed to load user interests"))?;

        Ok(rows
            .iter()
            .map(|row| Interest {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").field("db_path", &self.db_path).finish()
    }
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn upsert_many(&self, articles: &[NewArticle]) -> Result<usize> {
        let now = timestamp(Utc::now());
        let mut tx = self.pool.begin().await.map_err(storage_error("Failed to begin transaction"))?;

        for article in articles {
            if article.url.trim().is_empty() {
                // Dropping `tx` rolls back everything written so far.
                return Err(Error::Storage(format!("article {:?} has no url", article.title)));
            }
            sqlx::query(UPSERT_ARTICLE)
                .bind(&article.url)
                .bind(&article.title)
                .bind(&article.summary)
                .bind(article.image_url.as_deref())
                .bind(timestamp(article.published_at))
                .bind(&article.source)
                .bind(&article.category)
                .bind(article.sentiment.as_str())
                .bind(article.processing_status.as_str())
                .bind(&now)
                .execute(&mut *tx)
                .await
                .map_err(storage_error("Failed to store article"))?;
        }

        tx.commit().await.map_err(storage_error("Failed to commit articles"))?;
        Ok(articles.len())
    }

    async fn query_by_status_and_category(
        &self,
        status: ProcessingStatus,
        category: &CategoryFilter,
    ) -> Result<Vec<Article>> {
        let rows = match category {
            CategoryFilter::All => {
                sqlx::query("SELECT * FROM articles WHERE processing_status = ? ORDER BY published_at DESC")
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            CategoryFilter::Named(name) => {
                sqlx::query(
                    r#"
                    SELECT * FROM articles
                    WHERE processing_status = ? AND category = ?
                    ORDER BY published_at DESC
                    "#,
                )
                .bind(status.as_str())
                .bind(name)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(storage_error("Failed to query articles"))?;

        rows.iter().map(article_from_row).collect()
    }

    async fn mark_status(&self, urls: &[String], status: ProcessingStatus) -> Result<usize> {
        let now = timestamp(Utc::now());
        let mut tx = self.pool.begin().await.map_err(storage_error("Failed to begin transaction"))?;
        let mut updated = 0;
        for url in urls {
            let result = sqlx::query("UPDATE articles SET processing_status = ?, updated_at = ? WHERE url = ?")
                .bind(status.as_str())
                .bind(&now)
                .bind(url)
                .execute(&mut *tx)
                .await
                .map_err(storage_error("Failed to mark status"))?;
            updated += result.rows_affected() as usize;
        }
        tx.commit().await.map_err(storage_error("Failed to commit status change"))?;
        Ok(updated)
    }

    async fn get_article(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to load article"))?;
        row.as_ref().map(article_from_row).transpose()
    }
}

#[async_trait]
impl InterestStore for SqliteStore {
    async fn list_interests(&self) -> Result<Vec<Interest>> {
        let rows = sqlx::query("SELECT id, name FROM interests ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to list interests"))?;
        Ok(rows
            .iter()
            .map(|row| Interest {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn seed_interests(&self, names: &[&str]) -> Result<usize> {
        let mut tx = self.pool.begin().await.map_err(storage_error("Failed to begin transaction"))?;
        let mut added = 0;
        for name in names {
            let result = sqlx::query("INSERT OR IGNORE INTO interests (name) VALUES (?)")
                .bind(*name)
                .execute(&mut *tx)
                .await
                .map_err(storage_error("Failed to seed interest"))?;
            added += result.rows_affected() as usize;
        }
        tx.commit().await.map_err(storage_error("Failed to commit interests"))?;
        Ok(added)
    }

    async fn set_user_interests(&self, user: UserId, interest_ids: &[i64]) -> Result<Vec<Interest>> {
        let mut tx = self.pool.begin().await.map_err(storage_error("Failed to begin transaction"))?;
        sqlx::query("DELETE FROM user_interests WHERE user_id = ?")
            .bind(user)
            .execute(&mut *tx)
            .await
            .map_err(storage_error("Failed to clear user interests"))?;

        for id in interest_ids {
            // The SELECT yields nothing for ids missing from the catalog.
            sqlx::query(
                "INSERT OR IGNORE INTO user_interests (user_id, interest_id) SELECT ?, id FROM interests WHERE id = ?",
            )
            .bind(user)
            .bind(*id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error("Failed to store user interest"))?;
        }
        tx.commit().await.map_err(storage_error("Failed to commit user interests"))?;

        self.interests_for(user).await
    }

    async fn user_interests(&self, user: UserId) -> Result<Vec<Interest>> {
        self.interests_for(user).await
    }
}

#[async_trait]
impl BookmarkStore for SqliteStore {
    async fn add_bookmark(&self, user: UserId, article_id: i64) -> Result<()> {
        if self.get_article(article_id).await?.is_none() {
            return Err(Error::NotFound(format!("article {article_id}")));
        }
        sqlx::query("INSERT OR IGNORE INTO bookmarks (user_id, article_id, created_at) VALUES (?, ?, ?)")
            .bind(user)
            .bind(article_id)
            .bind(timestamp(Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(storage_error("Failed to add bookmark"))?;
        Ok(())
    }

    async fn remove_bookmark(&self, user: UserId, article_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = ? AND article_id = ?")
            .bind(user)
            .bind(article_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error("Failed to remove bookmark"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn bookmarks(&self, user: UserId) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT a.* FROM articles a
            JOIN bookmarks b ON b.article_id = a.id
            WHERE b.user_id = ?
            ORDER BY b.created_at DESC, b.rowid DESC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Failed to load bookmarks"))?;

        rows.iter().map(article_from_row).collect()
    }
}
