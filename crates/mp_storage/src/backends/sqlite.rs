use std::path::{Path, PathBuf};
use async_trait::async_trait;
use mp_core::{Article, ArticleStore, Error, Result, SaveOutcome, Sentiment, StoredArticle};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_PATH: &str = "news.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS news (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        text TEXT NOT NULL,
        source TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        sentiment TEXT
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS news_title_timestamp ON news (title, timestamp)",
];

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
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Storage(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn save(&self, article: &Article) -> Result<SaveOutcome> {
        let existing = sqlx::query("SELECT id FROM news WHERE title = ? AND timestamp = ?")
            .bind(&article.title)
            .bind(&article.timestamp)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to look up article: {}", e)))?;
        if existing.is_some() {
            info!("News already exists: {}", article.title);
            return Ok(SaveOutcome::Duplicate);
        }

        let sentiment = article
            .sentiment
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        // A concurrent writer may win between the lookup and this insert; the
        // unique index turns that into a no-op.
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO news (id, title, text, source, timestamp, sentiment)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&article.title)
        .bind(&article.text)
        .bind(&article.source)
        .bind(&article.timestamp)
        .bind(sentiment)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to store article: {}", e)))?;

        if result.rows_affected() == 0 {
            warn!("Lost insert race for: {}", article.title);
            return Ok(SaveOutcome::Duplicate);
        }
        info!("Saved news: {}", article.title);
        Ok(SaveOutcome::Inserted)
    }

    async fn list_all(&self) -> Result<Vec<StoredArticle>> {
        let rows = sqlx::query(
            "SELECT id, title, text, source, timestamp, sentiment FROM news ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to list articles: {}", e)))?;

        let mut articles = Vec::with_capacity(rows.len());
        for row in rows {
            let sentiment = row
                .get::<Option<String>, _>("sentiment")
                .map(|raw| serde_json::from_str::<Sentiment>(&raw))
                .transpose()?;

            articles.push(StoredArticle {
                id: row.get("id"),
                article: Article {
                    title: row.get("title"),
                    text: row.get("text"),
                    source: row.get("source"),
                    timestamp: row.get("timestamp"),
                    sentiment,
                },
            });
        }

        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp_core::SentimentLabel;
    use tempfile::tempdir;

    fn article() -> Article {
        Article {
            title: "Acme hits record profit".to_string(),
            text: "Acme Corp reported...".to_string(),
            source: "http://x".to_string(),
            timestamp: "2024-01-01T00:00:00".to_string(),
            sentiment: Some(Sentiment::new(SentimentLabel::Positive, 0.92)),
        }
    }

    #[tokio::test]
    async fn test_sqlite_save_is_idempotent() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("news.db");
        let store = SqliteStore::new_with_path(&db_path).await.unwrap();

        assert_eq!(store.save(&article()).await.unwrap(), SaveOutcome::Inserted);
        assert_eq!(store.save(&article()).await.unwrap(), SaveOutcome::Duplicate);

        let stored = store.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].article, article());
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("news.db");

        {
            let store = SqliteStore::new_with_path(&db_path).await.unwrap();
            let mut unscored = article();
            unscored.sentiment = None;
            store.save(&unscored).await.unwrap();
        }

        let store = SqliteStore::new_with_path(&db_path).await.unwrap();
        let stored = store.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].article.sentiment.is_none());
        assert_eq!(store.db_path(), db_path.as_path());
    }
}
