use async_trait::async_trait;
use mp_core::{Article, ArticleStore, Result, SaveOutcome, StoredArticle};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Process-local store, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: RwLock<Vec<StoredArticle>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.articles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn save(&self, article: &Article) -> Result<SaveOutcome> {
        let key = article.key();
        let exists = self
            .articles
            .read()
            .await
            .iter()
            .any(|stored| stored.article.key() == key);
        if exists {
            info!("News already exists: {}", article.title);
            return Ok(SaveOutcome::Duplicate);
        }

        self.articles.write().await.push(StoredArticle {
            id: Uuid::new_v4().to_string(),
            article: article.clone(),
        });
        info!("Saved news: {}", article.title);
        Ok(SaveOutcome::Inserted)
    }

    async fn list_all(&self) -> Result<Vec<StoredArticle>> {
        Ok(self.articles.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp_core::{Sentiment, SentimentLabel};

    fn article(text: &str) -> Article {
        Article {
            title: "Acme hits record profit".to_string(),
            text: text.to_string(),
            source: "http://x".to_string(),
            timestamp: "2024-01-01T00:00:00".to_string(),
            sentiment: Some(Sentiment::new(SentimentLabel::Positive, 0.92)),
        }
    }

    #[tokio::test]
    async fn test_save_is_idempotent_by_key() {
        let store = MemoryStore::new();
        assert_eq!(store.save(&article("Acme Corp reported...")).await.unwrap(), SaveOutcome::Inserted);
        assert_eq!(store.save(&article("Different body")).await.unwrap(), SaveOutcome::Duplicate);

        let stored = store.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].article.text, "Acme Corp reported...");
        assert!(Uuid::parse_str(&stored[0].id).is_ok());
    }

    #[tokio::test]
    async fn test_distinct_timestamps_are_kept() {
        let store = MemoryStore::new();
        let first = article("body");
        let mut second = article("body");
        second.timestamp = "2024-01-02T00:00:00".to_string();

        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();
        assert_eq!(store.len().await, 2);
    }
}
