use serde::{Deserialize, Serialize};
use crate::types::{Article, SentimentLabel};

const TREND_THRESHOLD: f64 = 0.6;
const INSIGHT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketTrend {
    Bullish,
    Bearish,
    Neutral,
}

impl MarketTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketTrend::Bullish => "bullish",
            MarketTrend::Bearish => "bearish",
            MarketTrend::Neutral => "neutral",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            MarketTrend::Bullish => "Consider investing in growth sectors",
            MarketTrend::Bearish => "Consider a defensive strategy",
            MarketTrend::Neutral => "Consider monitoring key indicators",
        }
    }
}

/// Aggregate sentiment over a set of articles, as rendered by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    pub query: Option<String>,
    pub total_articles: usize,
    pub positive_ratio: f64,
    pub negative_ratio: f64,
    pub neutral_ratio: f64,
    pub trend: MarketTrend,
    pub recommendation: String,
    pub insight: String,
}

impl MarketOverview {
    /// Builds the overview, optionally keeping only articles whose title or
    /// text mentions `query` (case-insensitive). Unscored articles count as
    /// neutral.
    pub fn from_articles<'a, I>(articles: I, query: Option<&str>) -> Self
    where
        I: IntoIterator<Item = &'a Article>,
    {
        let needle = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let (mut positive, mut negative, mut neutral) = (0usize, 0usize, 0usize);
        for article in articles {
            if let Some(needle) = &needle {
                if !mentions(article, needle) {
                    continue;
                }
            }
            match article.sentiment.map(|s| s.label) {
                Some(SentimentLabel::Positive) => positive += 1,
                Some(SentimentLabel::Negative) => negative += 1,
                _ => neutral += 1,
            }
        }

        let total = positive + negative + neutral;
        let ratio = |count: usize| if total == 0 { 0.0 } else { count as f64 / total as f64 };
        let (positive_ratio, negative_ratio, neutral_ratio) =
            (ratio(positive), ratio(negative), ratio(neutral));

        let trend = if positive_ratio > TREND_THRESHOLD {
            MarketTrend::Bullish
        } else if negative_ratio > TREND_THRESHOLD {
            MarketTrend::Bearish
        } else {
            MarketTrend::Neutral
        };

        let subject = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or("the market");
        let insight = if positive_ratio > INSIGHT_THRESHOLD {
            format!("The news sentiment is predominantly positive, indicating potential growth opportunities for {}.", subject)
        } else if negative_ratio > INSIGHT_THRESHOLD {
            format!("The news sentiment is predominantly negative, suggesting caution for {}.", subject)
        } else {
            format!("The news sentiment is balanced, indicating a stable outlook for {}.", subject)
        };

        Self {
            query: query.map(str::to_string),
            total_articles: total,
            positive_ratio,
            negative_ratio,
            neutral_ratio,
            trend,
            recommendation: trend.recommendation().to_string(),
            insight,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Based on the analysis of {} recent news articles, {:.0}% of the sentiment is positive, \
             {:.0}% is negative, and {:.0}% is neutral. The overall market trend appears to be {}. {}.",
            self.total_articles,
            self.positive_ratio * 100.0,
            self.negative_ratio * 100.0,
            self.neutral_ratio * 100.0,
            self.trend.as_str(),
            self.recommendation,
        )
    }
}

fn mentions(article: &Article, needle: &str) -> bool {
    article.title.to_lowercase().contains(needle) || article.text.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sentiment;

    fn article(title: &str, label: Option<SentimentLabel>) -> Article {
        Article {
            title: title.to_string(),
            text: format!("{} body", title),
            source: "http://example.com".to_string(),
            timestamp: "2024-01-01T00:00:00".to_string(),
            sentiment: label.map(|l| Sentiment::new(l, 0.9)),
        }
    }

    #[test]
    fn test_bullish_overview() {
        let articles = vec![
            article("Acme soars", Some(SentimentLabel::Positive)),
            article("Acme beats estimates", Some(SentimentLabel::Positive)),
            article("Acme expands", Some(SentimentLabel::Positive)),
            article("Acme flat", Some(SentimentLabel::Neutral)),
        ];
        let overview = MarketOverview::from_articles(&articles, None);
        assert_eq!(overview.total_articles, 4);
        assert_eq!(overview.positive_ratio, 0.75);
        assert_eq!(overview.neutral_ratio, 0.25);
        assert_eq!(overview.trend, MarketTrend::Bullish);
        assert_eq!(overview.recommendation, "Consider investing in growth sectors");
        assert!(overview.insight.contains("predominantly positive"));
        assert!(overview.summary().contains("75% of the sentiment is positive"));
    }

    #[test]
    fn test_unscored_articles_count_as_neutral() {
        let articles = vec![
            article("Globex slides", Some(SentimentLabel::Negative)),
            article("Globex update", None),
        ];
        let overview = MarketOverview::from_articles(&articles, None);
        assert_eq!(overview.negative_ratio, 0.5);
        assert_eq!(overview.neutral_ratio, 0.5);
        assert_eq!(overview.trend, MarketTrend::Neutral);
        assert!(overview.insight.contains("balanced"));
    }

    #[test]
    fn test_query_filter_is_case_insensitive() {
        let articles = vec![
            article("Acme slumps", Some(SentimentLabel::Negative)),
            article("Globex rallies", Some(SentimentLabel::Positive)),
        ];
        let overview = MarketOverview::from_articles(&articles, Some(" ACME Corp "));
        assert_eq!(overview.total_articles, 0);

        let overview = MarketOverview::from_articles(&articles, Some("  ACME "));
        assert_eq!(overview.total_articles, 1);
        assert_eq!(overview.trend, MarketTrend::Bearish);
        assert!(overview.insight.contains("caution for ACME."));
    }

    #[test]
    fn test_empty_overview() {
        let overview = MarketOverview::from_articles(&Vec::<Article>::new(), None);
        assert_eq!(overview.total_articles, 0);
        assert_eq!(overview.positive_ratio, 0.0);
        assert_eq!(overview.trend, MarketTrend::Neutral);
    }
}
