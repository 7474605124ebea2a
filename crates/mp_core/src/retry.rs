use std::future::Future;
use std::time::Duration;
use tracing::warn;
use crate::{Error, Result};

/// Message the Together API puts in throttled responses.
pub const TOGETHER_RATE_LIMIT_MESSAGE: &str = "Request was rejected due to request rate limiting";

/// Fixed-delay retry with a bounded number of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// Same attempt budget with no pause between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Runs `operation` until it succeeds, fails with an error `should_retry`
    /// rejects, or the attempt budget is spent. The last error is returned.
    pub async fn run<T, F, Fut, P>(&self, label: &str, mut operation: F, should_retry: P) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&Error) -> bool,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts && should_retry(&e) => {
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        label, attempt, max_attempts, e, self.delay
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Decides whether an upstream failure is a throttling signal.
pub trait RateLimitClassifier: Send + Sync {
    fn is_rate_limited(&self, status: Option<u16>, message: &str) -> bool;
}

/// Matches on HTTP status codes and substrings of the error description.
#[derive(Debug, Clone)]
pub struct SubstringRateLimitClassifier {
    needles: Vec<String>,
    statuses: Vec<u16>,
}

impl SubstringRateLimitClassifier {
    pub fn new(needles: Vec<String>, statuses: Vec<u16>) -> Self {
        Self { needles, statuses }
    }

    pub fn with_needle(mut self, needle: impl Into<String>) -> Self {
        self.needles.push(needle.into());
        self
    }
}

impl Default for SubstringRateLimitClassifier {
    fn default() -> Self {
        Self::new(vec![TOGETHER_RATE_LIMIT_MESSAGE.to_string()], vec![429])
    }
}

impl RateLimitClassifier for SubstringRateLimitClassifier {
    fn is_rate_limited(&self, status: Option<u16>, message: &str) -> bool {
        if let Some(status) = status {
            if self.statuses.contains(&status) {
                return true;
            }
        }
        self.needles.iter().any(|needle| message.contains(needle.as_str()))
    }
}
