pub mod error;
pub mod logging;
pub mod models;
pub mod overview;
pub mod retry;
pub mod source;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::{CompletionRequest, LanguageModel, SentimentClassifier};
pub use overview::{MarketOverview, MarketTrend};
pub use retry::{
    RateLimitClassifier, RetryPolicy, SubstringRateLimitClassifier, TOGETHER_RATE_LIMIT_MESSAGE,
};
pub use source::NewsSource;
pub use storage::ArticleStore;
pub use types::{
    now_timestamp, Article, ArticleKey, RawArticle, ResolutionResult, SaveOutcome, Sentiment,
    SentimentLabel, StoredArticle,
};
