pub mod agent;
pub mod general;
pub mod models;
pub mod resolver;
pub mod sentiment;

#[cfg(test)]
pub(crate) mod test_support;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub model: ModelKind,
    pub api_key: Option<String>,
    pub model_url: Option<String>,
    pub model_name: Option<String>,
}

pub mod prelude {
    pub use super::Config;
    pub use super::general::GeneralResolver;
    pub use super::models::{create_model, ModelKind};
    pub use super::resolver::QueryResolver;
    pub use super::sentiment::{create_classifier, SentimentCache, SentimentScorer};
    pub use mp_core::{Article, Error, RawArticle, ResolutionResult, Result};
}

pub use general::{GeneralResolver, APOLOGY};
pub use models::{create_model, ModelKind};
pub use resolver::QueryResolver;
pub use sentiment::{create_classifier, SentimentCache, SentimentScorer};
