use std::fmt;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use mp_core::{Error, Result, Sentiment, SentimentClassifier, SentimentLabel};

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            ClassificationResponse::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
            ClassificationResponse::Flat(scores) => scores,
        }
    }
}

/// FinBERT served by the Hugging Face inference API.
pub struct FinbertClassifier {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl fmt::Debug for FinbertClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinbertClassifier")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl FinbertClassifier {
    const BASE_URL: &'static str = "https://api-inference.huggingface.co";
    const MODEL: &'static str = "ProsusAI/finbert";

    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: Self::BASE_URL.to_string(),
            model: Self::MODEL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SentimentClassifier for FinbertClassifier {
    fn name(&self) -> &str {
        "FinBERT"
    }

    async fn classify(&self, text: &str) -> Result<Sentiment> {
        let response = self
            .client
            .post(format!("{}/models/{}", self.base_url.trim_end_matches('/'), self.model))
            .bearer_auth(&self.api_key)
            .json(&json!({ "inputs": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("FinBERT API error {}: {}", status, body)));
        }

        let best = response
            .json::<ClassificationResponse>()
            .await?
            .into_scores()
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| Error::Inference("FinBERT returned no labels".to_string()))?;

        Ok(Sentiment::new(best.label.parse::<SentimentLabel>()?, best.score))
    }
}
