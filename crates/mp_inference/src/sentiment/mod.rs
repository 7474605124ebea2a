use std::sync::Arc;
use mp_core::{Result, Sentiment, SentimentClassifier};
use tracing::{debug, error, info};

pub mod cache;
pub mod finbert;
pub mod keyword;

pub use cache::SentimentCache;
pub use finbert::FinbertClassifier;
pub use keyword::KeywordClassifier;

/// FinBERT's input window.
pub const MAX_INPUT_CHARS: usize = 512;

/// Picks FinBERT when a Hugging Face key is present, the lexicon otherwise.
pub fn create_classifier(hf_api_key: Option<String>) -> Result<Arc<dyn SentimentClassifier>> {
    match hf_api_key.filter(|key| !key.trim().is_empty()) {
        Some(key) => Ok(Arc::new(FinbertClassifier::new(key)?)),
        None => {
            info!("No Hugging Face key configured, using keyword sentiment");
            Ok(Arc::new(KeywordClassifier::new()))
        }
    }
}

/// Memoized sentiment scoring that never fails.
#[derive(Clone)]
pub struct SentimentScorer {
    classifier: Arc<dyn SentimentClassifier>,
    cache: Arc<SentimentCache>,
    max_chars: usize,
}

impl SentimentScorer {
    pub fn new(classifier: Arc<dyn SentimentClassifier>, cache: Arc<SentimentCache>) -> Self {
        Self {
            classifier,
            cache,
            max_chars: MAX_INPUT_CHARS,
        }
    }

    pub fn cache(&self) -> &Arc<SentimentCache> {
        &self.cache
    }

    pub async fn score(&self, text: &str) -> Sentiment {
        if text.is_empty() {
            return Sentiment::neutral();
        }
        if let Some(cached) = self.cache.get(text) {
            debug!("Returning cached sentiment");
            return cached;
        }

        let window = truncate_chars(text, self.max_chars);
        match self.classifier.classify(window).await {
            Ok(sentiment) => {
                self.cache.insert(text, sentiment);
                info!(
                    "Computed sentiment with {}: {} {:.3}",
                    self.classifier.name(),
                    sentiment.label,
                    sentiment.score
                );
                sentiment
            }
            Err(e) => {
                error!("Sentiment analysis failed: {}", e);
                Sentiment::neutral()
            }
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
