//! Result cache for expensive answer computations.
//!
//! Provides:
//! - 30-minute TTL by default, checked lazily on lookup
//! - Fingerprint keys hashed with SHA-256
//! - Injectable clock so expiry can be tested without sleeping
//! - Shared access across batch tasks via an internal Mutex

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use tracing::debug;

/// Default time-to-live for cached results.
pub const DEFAULT_TTL: Duration = Duration::minutes(30);

/// Number of leading input characters included in a fingerprint.
pub const FINGERPRINT_PREFIX_CHARS: usize = 100;

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

struct CacheEntry<T> {
    created_at: OffsetDateTime,
    payload: T,
}

/// Time-bounded memo table owned by one pipeline run.
pub struct ResultCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> ResultCache<T> {
    /// Create a cache with the default 30-minute TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock (tests drive expiry through this).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached payload for `key`, or `None` when absent or older than the TTL.
    /// Expired entries are removed on the way out.
    pub fn get(&self, key: &str) -> Option<T> {
        let storage_key = storage_key(key);
        let now = self.clock.now();
        let mut entries = self.lock();

        let expired = match entries.get(&storage_key) {
            None => {
                debug!(key = %storage_key, "cache miss");
                return None;
            }
            Some(entry) => now - entry.created_at > self.ttl,
        };

        if expired {
            entries.remove(&storage_key);
            debug!(key = %storage_key, "cache entry expired");
            return None;
        }

        debug!(key = %storage_key, "cache hit");
        entries.get(&storage_key).map(|entry| entry.payload.clone())
    }

    /// Store `payload` under `key`, replacing any previous entry and its timestamp.
    pub fn insert(&self, key: &str, payload: T) {
        let created_at = self.clock.now();
        self.lock()
            .insert(storage_key(key), CacheEntry { created_at, payload });
    }

    /// Entries currently held, including expired ones not yet looked up.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Get cache statistics (for monitoring)
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.lock();
        let expired = entries
            .values()
            .filter(|entry| now - entry.created_at > self.ttl)
            .count();
        CacheStats {
            entries: entries.len(),
            expired,
            ttl_seconds: self.ttl.whole_seconds(),
        }
    }
}

impl<T: Clone> Default for ResultCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub expired: usize,
    pub ttl_seconds: i64,
}

/// Readable cache key: `"{kind}_{input}"` with `input` cut to [`FINGERPRINT_PREFIX_CHARS`] characters.
pub fn fingerprint(kind: &str, input: &str) -> String {
    format!("{kind}_{}", prefix_chars(input))
}

/// Key for one answer computation: `"answer_{question}_{first 100 chars of content}"`.
pub fn answer_fingerprint(question: &str, content: &str) -> String {
    format!("answer_{question}_{}", prefix_chars(content))
}

fn prefix_chars(input: &str) -> &str {
    match input.char_indices().nth(FINGERPRINT_PREFIX_CHARS) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

fn storage_key(fingerprint: &str) -> String {
    hex::encode(Sha256::digest(fingerprint.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ManualClock(Mutex<OffsetDateTime>);

    impl ManualClock {
        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> OffsetDateTime {
            *self.0.lock().unwrap()
        }
    }

    fn manual_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock(Mutex::new(OffsetDateTime::UNIX_EPOCH)))
    }

    #[test]
    fn test_cache_hit() {
        let cache: ResultCache<String> = ResultCache::new();
        cache.insert("answer_q_c", "payload".to_string());
        assert_eq!(cache.get("answer_q_c").as_deref(), Some("payload"));
    }

    #[test]
    fn test_cache_miss_on_other_key() {
        let cache: ResultCache<String> = ResultCache::new();
        cache.insert("answer_a", "x".to_string());
        assert!(cache.get("answer_b").is_none());
    }

    #[test]
    fn test_cache_expiration_is_lazy() {
        let clock = manual_clock();
        let cache: ResultCache<u32> = ResultCache::new().with_clock(clock.clone());
        cache.insert("k", 7);

        clock.advance(Duration::minutes(30));
        assert_eq!(cache.get("k"), Some(7));

        clock.advance(Duration::seconds(1));
        // Still held until the next lookup of that key.
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().expired, 1);
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_reinsert_refreshes_timestamp() {
        let clock = manual_clock();
        let cache: ResultCache<u32> = ResultCache::with_ttl(Duration::seconds(10)).with_clock(clock.clone());
        cache.insert("k", 1);
        clock.advance(Duration::seconds(8));
        cache.insert("k", 2);
        clock.advance(Duration::seconds(8));
        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn test_fingerprint_truncates_by_chars() {
        let content = "é".repeat(150);
        let key = answer_fingerprint("What?", &content);
        assert_eq!(key, format!("answer_What?_{}", "é".repeat(100)));
        assert_eq!(fingerprint("answer", "abc"), "answer_abc");
    }

    #[test]
    fn test_storage_key_is_stable_hex() {
        let a = storage_key("answer_x");
        assert_eq!(a, storage_key("answer_x"));
        assert_ne!(a, storage_key("answer_y"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_clear_and_stats() {
        let cache: ResultCache<u32> = ResultCache::new();
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 2,
                expired: 0,
                ttl_seconds: 1800
            }
        );
        cache.clear();
        assert!(cache.is_empty());
    }
}
