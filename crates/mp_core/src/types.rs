use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(crate::Error::Parse(format!("Unknown sentiment label: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

impl Sentiment {
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        Self {
            label,
            score: score.clamp(0.0, 1.0),
        }
    }

    /// The value used for empty text and classifier failures.
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
        }
    }
}

/// An article as produced by a news source or the agent, before scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawArticle {
    pub title: String,
    pub text: String,
    pub source: String,
    pub timestamp: String,
}

impl RawArticle {
    pub fn key(&self) -> ArticleKey {
        ArticleKey::new(&self.title, &self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub text: String,
    pub source: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl Article {
    pub fn key(&self) -> ArticleKey {
        ArticleKey::new(&self.title, &self.timestamp)
    }

    pub fn with_sentiment(raw: RawArticle, sentiment: Sentiment) -> Self {
        Self {
            title: raw.title,
            text: raw.text,
            source: raw.source,
            timestamp: raw.timestamp,
            sentiment: Some(sentiment),
        }
    }
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Self {
            title: raw.title,
            text: raw.text,
            source: raw.source,
            timestamp: raw.timestamp,
            sentiment: None,
        }
    }
}

/// Identity of an article for deduplication and storage.
///
/// Two articles with the same title and timestamp are the same entity even if
/// their text differs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArticleKey {
    pub title: String,
    pub timestamp: String,
}

impl ArticleKey {
    pub fn new(title: &str, timestamp: &str) -> Self {
        Self {
            title: title.to_string(),
            timestamp: timestamp.to_string(),
        }
    }
}

/// Output of one resolution batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub articles: Vec<Article>,
}

/// An article as read back from a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArticle {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub article: Article,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Duplicate,
}

/// Current UTC time as an ISO-8601 string without offset.
pub fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
