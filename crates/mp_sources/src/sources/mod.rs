use async_trait::async_trait;
use mp_core::{NewsSource, RawArticle, Result};
use std::sync::Arc;

pub mod api;
pub mod scrape;

pub use api::ApiSource;
pub use scrape::ScrapeSource;

/// The closed set of fetch tools the resolver and agent can use.
#[derive(Debug, Clone)]
pub enum SourceKind {
    Scrape(ScrapeSource),
    Api(ApiSource),
}

#[async_trait]
impl NewsSource for SourceKind {
    fn name(&self) -> &str {
        match self {
            SourceKind::Scrape(s) => s.name(),
            SourceKind::Api(s) => s.name(),
        }
    }

    fn description(&self) -> &str {
        match self {
            SourceKind::Scrape(s) => s.description(),
            SourceKind::Api(s) => s.description(),
        }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<RawArticle>> {
        match self {
            SourceKind::Scrape(s) => s.fetch(query).await,
            SourceKind::Api(s) => s.fetch(query).await,
        }
    }
}

/// Builds the tool pool in the order the agent sees it: scraping first,
/// NewsAPI second.
pub fn default_sources(newsapi_key: impl Into<String>) -> Result<Vec<Arc<dyn NewsSource>>> {
    Ok(vec![
        Arc::new(SourceKind::Scrape(ScrapeSource::new()?)),
        Arc::new(SourceKind::Api(ApiSource::new(newsapi_key)?)),
    ])
}

/// Common utilities for sources
pub(crate) mod utils {
    use mp_core::{Error, Result};
    use scraper::Selector;

    pub fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::Source(format!("Invalid selector {}: {:?}", css, e)))
    }

    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources_order() {
        let sources = default_sources("key").unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["ScrapeNews", "FetchNewsAPI"]);
        assert!(sources[0].description().contains("Google News"));
        assert!(sources[1].description().contains("NewsAPI"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(utils::collapse_whitespace("  Acme\n  hits   record "), "Acme hits record");
    }

    #[test]
    fn test_invalid_selector() {
        assert!(utils::selector("div[").is_err());
        assert!(utils::selector("div#search div.g").is_ok());
    }
}
