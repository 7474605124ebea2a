use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use mp_core::{
    CompletionRequest, Error, LanguageModel, RateLimitClassifier, Result,
    SubstringRateLimitClassifier,
};

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: usize,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    text: String,
}

/// Completion client for the Together AI API (OpenAI-compatible `/v1/completions`).
pub struct TogetherModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: usize,
    rate_limits: Arc<dyn RateLimitClassifier>,
}

impl fmt::Debug for TogetherModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TogetherModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl TogetherModel {
    pub const DEFAULT_MODEL: &'static str = "mistralai/Mixtral-8x7B-Instruct-v0.1";
    const BASE_URL: &'static str = "https://api.together.xyz";

    pub fn new(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("Together API key is required".to_string()))?;
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: Self::BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: 1000,
            rate_limits: Arc::new(SubstringRateLimitClassifier::default()),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_rate_limit_classifier(mut self, classifier: Arc<dyn RateLimitClassifier>) -> Self {
        self.rate_limits = classifier;
        self
    }

    fn classify_failure(&self, status: Option<u16>, message: String) -> Error {
        if self.rate_limits.is_rate_limited(status, &message) {
            Error::RateLimited(message)
        } else {
            match status {
                Some(status) => Error::Inference(format!("Together API error {}: {}", status, message)),
                None => Error::Inference(format!("Together request failed: {}", message)),
            }
        }
    }
}

#[async_trait]
impl LanguageModel for TogetherModel {
    fn name(&self) -> &str {
        "Together"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = CompletionBody {
            model: &self.model,
            prompt: &request.prompt,
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            temperature: 0.2,
            stop: request.stop,
        };

        let response = self
            .client
            .post(format!("{}/v1/completions", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_failure(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.classify_failure(Some(status.as_u16()), text));
        }

        let parsed: CompletionResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| Error::Inference("Together response has no choices".to_string()))?;
        debug!("Together completion: {} chars", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    async fn model_for(server: &mockito::ServerGuard) -> TogetherModel {
        TogetherModel::new(Some("test-key".to_string()))
            .unwrap()
            .with_base_url(server.url())
    }

    #[test]
    fn test_model_requires_api_key() {
        let result = TogetherModel::new(None);
        assert!(matches!(result, Err(Error::Config(_))));
        assert!(TogetherModel::new(Some(String::new())).is_err());
        assert!(TogetherModel::new(Some("key".to_string())).is_ok());
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": TogetherModel::DEFAULT_MODEL,
                "prompt": "Say hi",
                "stop": ["\nObservation:"],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"x","choices":[{"text":" Hi there","index":0}]}"#)
            .create_async()
            .await;

        let model = model_for(&server).await;
        let text = model
            .complete(CompletionRequest::new("Say hi").with_stop("\nObservation:"))
            .await
            .unwrap();
        assert_eq!(text, " Hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_throttled_message_is_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/completions")
            .with_status(400)
            .with_body(r#"{"error":{"message":"Request was rejected due to request rate limiting. Your rate limits are 1 QPS"}}"#)
            .create_async()
            .await;

        let model = model_for(&server).await;
        let err = model.complete(CompletionRequest::new("x")).await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_429_is_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/completions")
            .with_status(429)
            .with_body("too many requests")
            .create_async()
            .await;

        let model = model_for(&server).await;
        let err = model.complete(CompletionRequest::new("x")).await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_server_error_is_not_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/completions")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let model = model_for(&server).await;
        let err = model.complete(CompletionRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[tokio::test]
    async fn test_custom_classifier() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/completions")
            .with_status(503)
            .with_body("capacity exhausted, try later")
            .create_async()
            .await;

        let classifier = SubstringRateLimitClassifier::default().with_needle("capacity exhausted");
        let model = model_for(&server)
            .await
            .with_rate_limit_classifier(Arc::new(classifier));
        let err = model.complete(CompletionRequest::new("x")).await.unwrap_err();
        assert!(err.is_rate_limited());
    }
}
