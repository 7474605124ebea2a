use async_trait::async_trait;
use crate::types::RawArticle;
use crate::Result;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Tool name shown to the language model
    fn name(&self) -> &str;

    /// Selection hint shown to the language model
    fn description(&self) -> &str;

    async fn fetch(&self, query: &str) -> Result<Vec<RawArticle>>;
}
