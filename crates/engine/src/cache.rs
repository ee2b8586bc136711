//! Response cache.
//!
//! Memoizes whole answers keyed by normalized query text. Lookup is exact
//! match after normalization — no fuzzy or semantic matching; a near-duplicate
//! query is a miss. One mutex guards the map, which makes each get/put
//! linearizable per key without finer-grained locking.

use crate::types::Answer;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Normalize a query into its cache key: trim, collapse internal whitespace,
/// case-fold.
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A cached answer with its creation instant.
struct CacheEntry {
    answer: Answer,
    created_at: Instant,
}

/// In-process answer cache with optional TTL expiry.
///
/// Answers are immutable post-construction; get hands out clones, so a cached
/// Answer referenced elsewhere is a stable snapshot.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Option<Duration>,
}

impl ResponseCache {
    /// Create a cache whose entries never expire.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: None,
        }
    }

    /// Create a cache with a time-to-live per entry.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    /// Look up an answer. Expired entries are removed lazily.
    pub fn get(&self, query: &str) -> Option<Answer> {
        let key = normalize_key(query);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(entry) = entries.get(&key) {
            if let Some(ttl) = self.ttl {
                if entry.created_at.elapsed() >= ttl {
                    entries.remove(&key);
                    return None;
                }
            }
            return entries.get(&key).map(|entry| entry.answer.clone());
        }

        None
    }

    /// Insert an answer. A duplicate key overwrites atomically — the old
    /// entry is replaced under the lock, so concurrent readers see either
    /// the old answer or the new one, never a partial write.
    pub fn put(&self, query: &str, answer: Answer) {
        let key = normalize_key(query);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key,
            CacheEntry {
                answer,
                created_at: Instant::now(),
            },
        );
    }

    /// Number of cached entries (expired entries may still be counted).
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Route, RouteDecision};
    use std::thread;

    fn answer(text: &str) -> Answer {
        Answer {
            text: text.to_string(),
            citations: Vec::new(),
            decision: RouteDecision::new(Route::ModelOnly, "test".to_string()),
            latency_ms: 1,
            backend: "test/model".to_string(),
        }
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("What is RAG?"), "what is rag?");
        assert_eq!(normalize_key("  what is rag?  "), "what is rag?");
        assert_eq!(normalize_key("What  is \t RAG?"), "what is rag?");
    }

    #[test]
    fn test_equivalent_queries_share_an_entry() {
        let cache = ResponseCache::new();
        cache.put("What is RAG?", answer("an answer"));

        assert!(cache.get(" what is rag? ").is_some());
        assert!(cache.get("What  is  RAG?").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_near_duplicate_is_a_miss() {
        let cache = ResponseCache::new();
        cache.put("What is RAG?", answer("an answer"));
        assert!(cache.get("What is RAG").is_none());
    }

    #[test]
    fn test_duplicate_key_overwrites() {
        let cache = ResponseCache::new();
        cache.put("q", answer("first"));
        cache.put("q", answer("second"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("q").unwrap().text, "second");
    }

    #[test]
    fn test_cached_answer_is_returned_unchanged() {
        let cache = ResponseCache::new();
        let original = answer("stable");
        cache.put("q", original.clone());

        let first = cache.get("q").unwrap();
        let second = cache.get("q").unwrap();
        assert_eq!(first, original);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = ResponseCache::with_ttl(Duration::from_millis(20));
        cache.put("q", answer("short-lived"));

        assert!(cache.get("q").is_some());
        thread::sleep(Duration::from_millis(30));
        assert!(cache.get("q").is_none());
    }

    #[test]
    fn test_clear() {
        let cache = ResponseCache::new();
        cache.put("a", answer("1"));
        cache.put("b", answer("2"));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
