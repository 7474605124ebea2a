use async_trait::async_trait;
use crate::types::{Article, SaveOutcome, StoredArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert the article unless one with the same (title, timestamp) exists.
    async fn save(&self, article: &Article) -> Result<SaveOutcome>;

    /// Every stored article, identifiers rendered as strings.
    async fn list_all(&self) -> Result<Vec<StoredArticle>>;
}
