use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use langchain_rust::language_models::llm::LLM;
use langchain_rust::llm::ollama::client::{Ollama, OllamaClient};
use mp_core::{
    CompletionRequest, Error, LanguageModel, RateLimitClassifier, Result,
    SubstringRateLimitClassifier,
};
use url::Url;

const DEFAULT_URL: &str = "http://localhost:11434/mistral";

#[derive(Debug, Clone, PartialEq)]
pub struct OllamaModelConfig {
    host: String,
    port: u16,
    model_name: String,
}

impl Default for OllamaModelConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".to_string(),
            port: 11434,
            model_name: "mistral".to_string(),
        }
    }
}

impl OllamaModelConfig {
    /// Parses `scheme://host:port/model`; missing parts keep their defaults.
    pub fn from_url(url: Option<&str>) -> Result<Self> {
        let parsed = Url::parse(url.unwrap_or(DEFAULT_URL))
            .map_err(|e| Error::Config(format!("Invalid Ollama URL: {}", e)))?;
        let defaults = Self::default();
        let model_name = parsed.path().trim_start_matches('/').to_string();

        Ok(Self {
            host: format!("{}://{}", parsed.scheme(), parsed.host_str().unwrap_or("localhost")),
            port: parsed.port().unwrap_or(defaults.port),
            model_name: if model_name.is_empty() { defaults.model_name } else { model_name },
        })
    }
}

/// Local model served by Ollama, driven through langchain-rust.
pub struct OllamaModel {
    ollama: Ollama,
    config: OllamaModelConfig,
    rate_limits: Arc<dyn RateLimitClassifier>,
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("ollama", &"<Ollama>")
            .field("config", &self.config)
            .finish()
    }
}

impl OllamaModel {
    pub fn new(config: OllamaModelConfig) -> Self {
        let client = Arc::new(OllamaClient::new(config.host.clone(), config.port));
        let ollama = Ollama::new(client, config.model_name.clone(), None);
        Self {
            ollama,
            config,
            rate_limits: Arc::new(SubstringRateLimitClassifier::default()),
        }
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let mut text = self.ollama.invoke(&request.prompt).await.map_err(|e| {
            let message = e.to_string();
            if self.rate_limits.is_rate_limited(None, &message) {
                Error::RateLimited(message)
            } else {
                Error::Inference(format!("Ollama completion failed: {}", message))
            }
        })?;
        // Ollama ignores stop sequences through this client.
        for stop in &request.stop {
            if let Some(idx) = text.find(stop.as_str()) {
                text.truncate(idx);
            }
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_url() {
        let config = OllamaModelConfig::from_url(Some("http://gpu-box:1234/llama3")).unwrap();
        assert_eq!(config.host, "http://gpu-box");
        assert_eq!(config.port, 1234);
        assert_eq!(config.model_name, "llama3");

        assert_eq!(OllamaModelConfig::from_url(None).unwrap(), OllamaModelConfig::default());
        assert!(OllamaModelConfig::from_url(Some("not a url")).is_err());
    }
}
