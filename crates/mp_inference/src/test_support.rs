use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use mp_core::{
    Error, NewsSource, RawArticle, Result, Sentiment, SentimentClassifier, SentimentLabel,
};

/// News source returning canned articles, or failing when built with `failing`.
pub struct StaticSource {
    name: &'static str,
    articles: Vec<RawArticle>,
    fail: bool,
    calls: AtomicUsize,
    queries: std::sync::Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn new(name: &'static str, articles: Vec<RawArticle>) -> Self {
        Self {
            name,
            articles,
            fail: false,
            calls: AtomicUsize::new(0),
            queries: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            fail: true,
            ..Self::new(name, Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsSource for StaticSource {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Returns canned articles."
    }

    async fn fetch(&self, query: &str) -> Result<Vec<RawArticle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(Error::Source(format!("{} is down", self.name)));
        }
        Ok(self.articles.clone())
    }
}

/// Classifier that always answers with the same sentiment.
pub struct FixedClassifier(pub Sentiment);

impl FixedClassifier {
    pub fn positive(score: f64) -> Self {
        Self(Sentiment::new(SentimentLabel::Positive, score))
    }
}

#[async_trait]
impl SentimentClassifier for FixedClassifier {
    fn name(&self) -> &str {
        "Fixed"
    }

    async fn classify(&self, _text: &str) -> Result<Sentiment> {
        Ok(self.0)
    }
}

pub fn article(title: &str, text: &str, timestamp: &str) -> RawArticle {
    RawArticle {
        title: title.to_string(),
        text: text.to_string(),
        source: "http://x".to_string(),
        timestamp: timestamp.to_string(),
    }
}
