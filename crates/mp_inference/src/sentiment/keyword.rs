use async_trait::async_trait;
use mp_core::{Result, Sentiment, SentimentClassifier, SentimentLabel};

const POSITIVE: &[&str] = &[
    "beat", "beats", "bullish", "gain", "gains", "growth", "grow", "grows", "profit", "profits",
    "profitable", "rally", "rallies", "record", "rise", "rises", "rose", "soar", "soars", "strong",
    "surge", "surges", "upgrade", "upgraded", "outperform", "boost", "boosts", "jump", "jumps",
];

const NEGATIVE: &[&str] = &[
    "bearish", "cut", "cuts", "decline", "declines", "drop", "drops", "fall", "falls", "fell",
    "fraud", "lawsuit", "loss", "losses", "miss", "misses", "plunge", "plunges", "recession",
    "slump", "slumps", "weak", "downgrade", "downgraded", "layoffs", "bankruptcy", "default",
    "tumble", "tumbles",
];

/// Lexicon classifier for running without a hosted model.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    fn counts(text: &str) -> (usize, usize) {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .fold((0, 0), |(pos, neg), word| {
                if POSITIVE.contains(&word.as_str()) {
                    (pos + 1, neg)
                } else if NEGATIVE.contains(&word.as_str()) {
                    (pos, neg + 1)
                } else {
                    (pos, neg)
                }
            })
    }
}

#[async_trait]
impl SentimentClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        "Keyword"
    }

    async fn classify(&self, text: &str) -> Result<Sentiment> {
        let (pos, neg) = Self::counts(text);
        let total = pos + neg;
        if total == 0 {
            return Ok(Sentiment::new(SentimentLabel::Neutral, 0.5));
        }

        let balance = (pos as f64 - neg as f64) / total as f64;
        let label = match pos.cmp(&neg) {
            std::cmp::Ordering::Greater => SentimentLabel::Positive,
            std::cmp::Ordering::Less => SentimentLabel::Negative,
            std::cmp::Ordering::Equal => SentimentLabel::Neutral,
        };
        // Confidence grows with how one-sided the hits are.
        Ok(Sentiment::new(label, 0.5 + 0.5 * balance.abs()))
    }
}
