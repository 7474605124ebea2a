use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use lru::LruCache;
use mp_core::Sentiment;

pub const DEFAULT_CAPACITY: usize = 1000;
pub const DEFAULT_TTL: Duration = Duration::from_secs(86_400);

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    sentiment: Sentiment,
    inserted_at: Instant,
}

/// Sentiment memo keyed by exact article text.
///
/// Holds at most `capacity` entries, evicting the least recently used one on
/// overflow. Entries older than `ttl` are never returned.
#[derive(Debug)]
pub struct SentimentCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for SentimentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl SentimentCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn get(&self, text: &str) -> Option<Sentiment> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let expired = match entries.get(text) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => return Some(entry.sentiment),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(text);
        }
        None
    }

    pub fn insert(&self, text: &str, sentiment: Sentiment) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.put(
            text.to_string(),
            CacheEntry {
                sentiment,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).cap().get()
    }
}
