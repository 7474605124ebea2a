use async_trait::async_trait;
use crate::types::Sentiment;
use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: Option<usize>,
    pub stop: Vec<String>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop.push(stop.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    /// Run a single completion. Throttling by the provider must surface as
    /// `Error::RateLimited`.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Classify already-truncated text.
    async fn classify(&self, text: &str) -> Result<Sentiment>;
}
