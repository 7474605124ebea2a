use std::sync::Arc;
use mp_core::{CompletionRequest, Error, LanguageModel, RetryPolicy};
use tracing::{error, info};

pub const APOLOGY: &str = "I'm sorry, I couldn't process your query at this time.";

const PROMPT_TEMPLATE: &str = "You are a helpful general knowledge assistant. Answer the following query to the best of your knowledge in a concise and informative manner:

Query: {input}

Provide a direct answer without any additional formatting or examples unless necessary.";

/// Free-form question answering straight from the language model.
pub struct GeneralResolver {
    model: Arc<dyn LanguageModel>,
    retry: RetryPolicy,
}

impl GeneralResolver {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn answer(&self, query: &str) -> String {
        let prompt = PROMPT_TEMPLATE.replace("{input}", query);
        let outcome = self
            .retry
            .run(
                "General agent",
                |_| self.model.complete(CompletionRequest::new(prompt.clone())),
                Error::is_rate_limited,
            )
            .await;

        match outcome {
            Ok(response) => {
                let response = response.trim().to_string();
                info!("General agent response for query '{}': {}", query, response);
                response
            }
            Err(e) => {
                error!("General agent failed for query '{}': {}", query, e);
                APOLOGY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScriptedModel, ScriptedReply};

    #[tokio::test]
    async fn test_answer() {
        let model = Arc::new(ScriptedModel::always(ScriptedReply::Text(
            "  Paris is the capital of France.\n".to_string(),
        )));
        let resolver = GeneralResolver::new(model.clone());

        assert_eq!(
            resolver.answer("What is the capital of France?").await,
            "Paris is the capital of France."
        );
        assert!(model.prompts()[0].contains("Query: What is the capital of France?"));
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let model = Arc::new(ScriptedModel::new(vec![
            ScriptedReply::RateLimited,
            ScriptedReply::Text("42".to_string()),
        ]));
        let resolver = GeneralResolver::new(model.clone()).with_retry(RetryPolicy::immediate(3));

        assert_eq!(resolver.answer("meaning of life").await, "42");
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_failures_apologize() {
        let model = Arc::new(ScriptedModel::always(ScriptedReply::Fail("boom".to_string())));
        let resolver = GeneralResolver::new(model.clone()).with_retry(RetryPolicy::immediate(3));
        assert_eq!(resolver.answer("anything").await, APOLOGY);
        assert_eq!(model.calls(), 1);

        let model = Arc::new(ScriptedModel::always(ScriptedReply::RateLimited));
        let resolver = GeneralResolver::new(model.clone()).with_retry(RetryPolicy::immediate(3));
        assert_eq!(resolver.answer("anything").await, APOLOGY);
        assert_eq!(model.calls(), 3);
    }
}
