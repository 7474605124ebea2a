use async_trait::async_trait;
use mp_core::{now_timestamp, Error, NewsSource, RawArticle, Result, RetryPolicy};
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;
use super::utils;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Scrapes the Google News result page for a query.
#[derive(Debug, Clone)]
pub struct ScrapeSource {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
    max_results: usize,
}

impl ScrapeSource {
    pub const NAME: &'static str = "ScrapeNews";
    const BASE_URL: &'static str = "https://www.google.com";
    const DESCRIPTION: &'static str = "Scrapes news articles from Google News for a given query.";

    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            base_url: Self::BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            max_results: 5,
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
        let url = Url::parse_with_params(
            &format!("{}/search", self.base_url.trim_end_matches('/')),
            &[("q", format!("{} news", query).as_str()), ("tbm", "nws")],
        )
        .map_err(|e| Error::Source(format!("Failed to build search URL: {}", e)))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Source(format!("News search returned {}", status)));
        }
        let html = response.text().await?;
        parse_results(&html, self.max_results)
    }
}

/// Extracts up to `limit` result blocks from a news search page. Missing
/// fields fall back to placeholders; every article is stamped with now.
pub fn parse_results(html: &str, limit: usize) -> Result<Vec<RawArticle>> {
    let document = Html::parse_document(html);
    let block_selector = utils::selector("div#search div.g")?;
    let title_selector = utils::selector("h3")?;
    let link_selector = utils::selector("a")?;
    let text_selector = utils::selector("div")?;

    let articles = document
        .select(&block_selector)
        .take(limit)
        .map(|item| {
            let title = item
                .select(&title_selector)
                .next()
                .map(|el| utils::collapse_whitespace(&el.text().collect::<String>()))
                .unwrap_or_else(|| "No title".to_string());
            let source = item
                .select(&link_selector)
                .next()
                .and_then(|el| el.value().attr("href"))
                .unwrap_or_default()
                .to_string();
            let text = item
                .select(&text_selector)
                .next()
                .map(|el| utils::collapse_whitespace(&el.text().collect::<String>()))
                .unwrap_or_default();
            RawArticle {
                title,
                text,
                source,
                timestamp: now_timestamp(),
            }
        })
        .collect();

    Ok(articles)
}

#[async_trait]
impl NewsSource for ScrapeSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    async fn fetch(&self, query: &str) -> Result<Vec<RawArticle>> {
        // Any failure is retried here, network or parsing alike.
        let result = self
            .retry
            .run(Self::NAME, |_| self.fetch_once(query), |_| true)
            .await;
        match &result {
            Ok(articles) => debug!("{} found {} articles for {}", Self::NAME, articles.len(), query),
            Err(e) => error!("Failed to scrape news for {}: {}", query, e),
        }
        result
    }
}
