use async_trait::async_trait;
use mp_core::{Error, NewsSource, RawArticle, Result, RetryPolicy};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

impl From<NewsApiArticle> for RawArticle {
    fn from(article: NewsApiArticle) -> Self {
        RawArticle {
            title: article.title.unwrap_or_default(),
            text: article.description.unwrap_or_default(),
            source: article.url.unwrap_or_default(),
            timestamp: article.published_at.unwrap_or_default(),
        }
    }
}

/// Queries the NewsAPI `everything` endpoint.
#[derive(Clone)]
pub struct ApiSource {
    client: Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
    max_results: usize,
}

impl fmt::Debug for ApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSource")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl ApiSource {
    pub const NAME: &'static str = "FetchNewsAPI";
    const BASE_URL: &'static str = "https://newsapi.org";
    const DESCRIPTION: &'static str = "Fetches news articles from NewsAPI for a given query.";

    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("marketpulse/0.1")
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: Self::BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            max_results: 10,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_once(&self, query: &str) -> Result<Vec<RawArticle>> {
        if self.api_key.is_empty() {
            return Err(Error::Config("NewsAPI key is required".to_string()));
        }

        let url = Url::parse_with_params(
            &format!("{}/v2/everything", self.base_url.trim_end_matches('/')),
            &[
                ("q", query),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("apiKey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| Error::Source(format!("Failed to build NewsAPI URL: {}", e)))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body: EverythingResponse = response.json().await?;
        if !status.is_success() || body.status != "ok" {
            return Err(Error::Source(format!(
                "NewsAPI returned {}: {}",
                status,
                body.message.unwrap_or_else(|| body.status.clone())
            )));
        }

        let mut articles = body.articles;
        // Newest first; ISO-8601 strings order lexicographically.
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(articles
            .into_iter()
            .take(self.max_results)
            .map(RawArticle::from)
            .collect())
    }
}

#[async_trait]
impl NewsSource for ApiSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    async fn fetch(&self, query: &str) -> Result<Vec<RawArticle>> {
        let result = self
            .retry
            .run(Self::NAME, |_| self.fetch_once(query), |_| true)
            .await;
        match &result {
            Ok(articles) => debug!("{} found {} articles for {}", Self::NAME, articles.len(), query),
            Err(e) => error!("Failed to fetch news from NewsAPI for {}: {}", query, e),
        }
        result
    }
}
