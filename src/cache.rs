//! In-Process TTL Cache
//! Mission: Avoid store round-trips for repeated reads within a validity window
//!
//! Entries carry an absolute expiry deadline; expired entries are simply not
//! returned on lookup (lazy expiry, no background eviction). The cache is
//! bounded by application key cardinality, so no LRU policy is needed.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Default validity window for cached reads.
pub const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Key-value cache with absolute time-based expiry and explicit invalidation.
///
/// Owned by the composition root and passed by reference to the components
/// that need it; never a module-level singleton. Entries are derived data,
/// never the source of truth.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a key. Expired entries are removed and reported as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert a value with the cache's TTL, replacing any previous entry.
    pub fn put(&self, key: K, value: V) {
        let mut entries = self.entries.lock();
        entries.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop a key immediately so the next read goes to the backing store.
    pub fn invalidate(&self, key: &K) {
        self.entries.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_cached_value_within_ttl() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        cache.put("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"b"), None);
    }

    #[test]
    fn test_expired_entries_are_not_returned() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_millis(10));
        cache.put("a", 1);
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        cache.put("a", 1);
        cache.invalidate(&"a");
        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn test_put_replaces_existing_entry() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        cache.put("a", 1);
        cache.put("a", 2);
        assert_eq!(cache.get(&"a"), Some(2));
    }
}
