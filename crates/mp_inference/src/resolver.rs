use std::collections::HashSet;
use std::sync::Arc;
use mp_core::{
    Article, ArticleKey, Error, LanguageModel, NewsSource, RawArticle, ResolutionResult,
    RetryPolicy,
};
use tracing::{debug, error, info, warn};
use crate::agent::{parse_articles, ToolAgent};
use crate::sentiment::SentimentScorer;

/// Turns query strings into sentiment-annotated articles.
///
/// Each query goes through the tool-selecting agent. Rate limiting is retried
/// under the policy; if the agent still cannot answer, the fallback source is
/// queried directly, once. An answer that is not a JSON list also goes to
/// the fallback.
pub struct QueryResolver {
    agent: ToolAgent,
    fallback: Arc<dyn NewsSource>,
    scorer: SentimentScorer,
    retry: RetryPolicy,
}

impl QueryResolver {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        tools: Vec<Arc<dyn NewsSource>>,
        fallback: Arc<dyn NewsSource>,
        scorer: SentimentScorer,
    ) -> Self {
        Self {
            agent: ToolAgent::new(model, tools),
            fallback,
            scorer,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.agent = self.agent.with_max_iterations(max_iterations);
        self
    }

    pub fn scorer(&self) -> &SentimentScorer {
        &self.scorer
    }

    /// Processes queries in order. Never fails; a broken query contributes
    /// no articles.
    pub async fn resolve(&self, queries: &[String]) -> ResolutionResult {
        let mut seen: HashSet<ArticleKey> = HashSet::new();
        let mut articles = Vec::new();

        for query in queries {
            let raw = self.fetch_raw(query).await;
            debug!("Query '{}' produced {} raw articles", query, raw.len());

            for item in raw {
                if item.text.is_empty() {
                    debug!("Skipping article without text: {}", item.title);
                    continue;
                }
                if !seen.insert(item.key()) {
                    debug!("Skipping duplicate article: {}", item.title);
                    continue;
                }
                let sentiment = self.scorer.score(&item.text).await;
                articles.push(Article::with_sentiment(item, sentiment));
            }
        }

        info!("Resolution produced {} articles", articles.len());
        ResolutionResult { articles }
    }

    async fn fetch_raw(&self, query: &str) -> Vec<RawArticle> {
        let task = format!("Fetch financial news for {}.", query);
        let outcome = self
            .retry
            .run("News agent", |_| self.agent.run(&task), Error::is_rate_limited)
            .await;

        match outcome {
            Ok(answer) => match parse_articles(&answer) {
                Ok(articles) => articles,
                Err(e) => {
                    error!("Could not parse agent output for '{}': {}", query, e);
                    info!("Falling back to direct tool call: {}", self.fallback.name());
                    self.fetch_fallback(query).await
                }
            },
            Err(e) => {
                if e.is_rate_limited() {
                    warn!(
                        "Rate limit hit for news query: {}. Falling back to {}.",
                        query,
                        self.fallback.name()
                    );
                } else {
                    error!("News agent failed for '{}': {}", query, e);
                    info!("Falling back to direct tool call: {}", self.fallback.name());
                }
                self.fetch_fallback(query).await
            }
        }
    }

    async fn fetch_fallback(&self, query: &str) -> Vec<RawArticle> {
        match self.fallback.fetch(query).await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Fallback {} failed for '{}': {}", self.fallback.name(), query, e);
                Vec::new()
            }
        }
    }
}
