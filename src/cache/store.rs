//! Cache Store Module
//!
//! Bounded cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, LruTracker, SystemClock};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Bounded cache with LRU eviction and per-entry TTL.
///
/// Holds at most `max_size` entries. Every operation is O(1) expected time
/// apart from [`CacheStore::cleanup_expired`]. The API takes `&mut self`;
/// wrap the store in a lock (see [`crate::memoize::Memoizer`]) to share it.
///
/// Values are handed out as clones. Store `Arc<T>` for large payloads so
/// readers share one read-only copy.
#[derive(Debug)]
pub struct CacheStore<K, V, C = SystemClock> {
    /// Key-value storage, each entry carrying its own expiry and recency slot
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
    /// TTL applied when `set` is called without one
    default_ttl: Duration,
    clock: C,
}

impl<K, V> CacheStore<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// # Errors
    /// Returns [`CacheError::ZeroCapacity`] when `max_size` is 0.
    pub fn new(max_size: usize, default_ttl: Duration) -> Result<Self> {
        Self::with_clock(max_size, default_ttl, SystemClock)
    }

    /// Creates a new CacheStore from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(config.max_size, config.default_ttl_duration())
    }
}

impl<K, V, C> CacheStore<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    /// Creates a new CacheStore reading time from `clock`.
    pub fn with_clock(max_size: usize, default_ttl: Duration, clock: C) -> Result<Self> {
        if max_size == 0 {
            return Err(CacheError::ZeroCapacity);
        }
        Ok(Self {
            entries: HashMap::with_capacity(max_size),
            lru: LruTracker::with_capacity(max_size),
            stats: CacheStats::new(),
            max_size,
            default_ttl,
            clock,
        })
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// If the key already exists, value and TTL are replaced and the key
    /// becomes the most recently used. If the key is new and the cache is at
    /// capacity, the least recently used entry is evicted first, whether or
    /// not it is still fresh.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (uses the store's default TTL if None)
    pub fn set(&mut self, key: K, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let now = self.clock.now();

        // Overwrite case
        if let Some(entry) = self.entries.get_mut(&key) {
            if entry.is_expired(now) {
                self.stats.record_expirations(1);
            }
            entry.refresh(value, now, ttl);
            self.lru.touch(entry.slot);
            return;
        }

        // If at capacity, evict oldest entry
        if self.entries.len() >= self.max_size {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
                debug!(capacity = self.max_size, "evicted least recently used entry");
            }
        }

        let slot = self.lru.push_front(key.clone());
        self.entries
            .insert(key, CacheEntry::new(value, now, ttl).with_slot(slot));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired, promoting the key to most
    /// recently used. Expired entries are removed and counted as misses.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();

        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired(now) {
            let slot = entry.slot;
            self.entries.remove(key);
            self.lru.remove(slot);
            self.stats.record_miss();
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            debug!("dropped expired entry on read");
            return None;
        }

        let value = entry.value.clone();
        self.lru.touch(entry.slot);
        self.stats.record_hit();
        Some(value)
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns whether an entry was removed.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.remove(key) {
            Some(entry) => {
                self.lru.remove(entry.slot);
                self.stats.set_total_entries(self.entries.len());
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Removes every entry. Counters other than the entry count are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now();
        let lru = &mut self.lru;
        let before = self.entries.len();

        self.entries.retain(|_, entry| {
            let expired = entry.is_expired(now);
            if expired {
                lru.remove(entry.slot);
            }
            !expired
        });

        let count = before - self.entries.len();
        self.stats.record_expirations(count);
        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> + '_ {
        self.lru.iter()
    }

    // == Length ==
    /// Returns the current number of entries, including expired ones not yet observed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    const HOUR: Duration = Duration::from_secs(3600);

    fn store(max_size: usize) -> (CacheStore<String, String, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let store = CacheStore::with_clock(max_size, HOUR, clock.clone()).unwrap();
        (store, clock)
    }

    fn set(store: &mut CacheStore<String, String, ManualClock>, key: &str, value: &str) {
        store.set(key.to_string(), value.to_string(), None);
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore<String, String> = CacheStore::new(100, HOUR).unwrap();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 100);
        assert_eq!(store.default_ttl(), HOUR);
    }

    #[test]
    fn test_store_zero_capacity_rejected() {
        let result: Result<CacheStore<String, String>> = CacheStore::new(0, HOUR);
        assert_eq!(result.unwrap_err(), CacheError::ZeroCapacity);
    }

    #[test]
    fn test_store_from_config() {
        let config = Config {
            max_size: 7,
            default_ttl: 60,
            ..Config::default()
        };
        let store: CacheStore<String, u32> = CacheStore::from_config(&config).unwrap();
        assert_eq!(store.capacity(), 7);
        assert_eq!(store.default_ttl(), Duration::from_secs(60));

        let invalid = Config {
            max_size: 0,
            ..Config::default()
        };
        let rejected: Result<CacheStore<String, u32>> = CacheStore::from_config(&invalid);
        assert!(rejected.is_err());
    }

    #[test]
    fn test_store_set_and_get() {
        let (mut store, _) = store(100);

        set(&mut store, "key1", "value1");

        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (mut store, _) = store(100);

        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let (mut store, _) = store(100);

        set(&mut store, "key1", "value1");

        assert!(store.delete("key1"));
        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_delete_nonexistent_leaves_others() {
        let (mut store, _) = store(100);

        set(&mut store, "key1", "value1");

        assert!(!store.delete("nonexistent"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("key1"), Some("value1".to_string()));
    }

    #[test]
    fn test_store_overwrite() {
        let (mut store, _) = store(100);

        set(&mut store, "key1", "value1");
        set(&mut store, "key1", "value2");

        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let (mut store, clock) = store(100);

        store.set("key1".to_string(), "v1".to_string(), Some(Duration::from_secs(10)));
        clock.advance(Duration::from_secs(8));
        store.set("key1".to_string(), "v2".to_string(), Some(Duration::from_secs(10)));
        clock.advance(Duration::from_secs(8));

        assert_eq!(store.get("key1"), Some("v2".to_string()));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let (mut store, clock) = store(100);

        store.set("key1".to_string(), "value1".to_string(), Some(Duration::from_secs(1)));

        // Still live exactly at the TTL
        clock.advance(Duration::from_secs(1));
        assert!(store.get("key1").is_some());

        clock.advance(Duration::from_millis(1));
        assert_eq!(store.get("key1"), None);
        assert!(store.is_empty());

        let stats = store.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_store_zero_ttl_stored_then_dropped_on_read() {
        let (mut store, _) = store(100);

        store.set("key1".to_string(), "value1".to_string(), Some(Duration::ZERO));
        assert_eq!(store.len(), 1);

        assert_eq!(store.get("key1"), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_default_ttl_applies() {
        let (mut store, clock) = store(100);

        set(&mut store, "key1", "value1");
        clock.advance(HOUR);
        assert!(store.get("key1").is_some());
        clock.advance(Duration::from_secs(1));
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_lru_eviction() {
        let (mut store, _) = store(3);

        set(&mut store, "key1", "value1");
        set(&mut store, "key2", "value2");
        set(&mut store, "key3", "value3");

        // Cache is full, adding key4 should evict key1 (oldest)
        set(&mut store, "key4", "value4");

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("key1"), None);
        assert!(store.get("key2").is_some());
        assert!(store.get("key3").is_some());
        assert!(store.get("key4").is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let (mut store, _) = store(3);

        set(&mut store, "key1", "value1");
        set(&mut store, "key2", "value2");
        set(&mut store, "key3", "value3");

        // Access key1 to make it most recently used
        store.get("key1");

        // Adding key4 should evict key2 (now oldest)
        set(&mut store, "key4", "value4");

        assert!(store.get("key1").is_some());
        assert_eq!(store.get("key2"), None);
    }

    #[test]
    fn test_store_lru_touch_on_overwrite() {
        let (mut store, _) = store(2);

        set(&mut store, "a", "1");
        set(&mut store, "b", "2");
        set(&mut store, "a", "1b");
        set(&mut store, "c", "3");

        assert_eq!(store.get("b"), None);
        assert_eq!(store.get("a"), Some("1b".to_string()));
    }

    #[test]
    fn test_store_eviction_ignores_freshness() {
        let (mut store, clock) = store(2);

        // The oldest entry is evicted even though a newer one has already expired
        store.set("old".to_string(), "1".to_string(), Some(HOUR));
        store.set("stale".to_string(), "2".to_string(), Some(Duration::from_secs(1)));
        clock.advance(Duration::from_secs(5));
        set(&mut store, "new", "3");

        assert_eq!(store.get("old"), None);
        assert_eq!(store.get("new"), Some("3".to_string()));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_set_over_expired_key() {
        let (mut store, clock) = store(100);

        store.set("key1".to_string(), "old".to_string(), Some(Duration::from_secs(1)));
        clock.advance(Duration::from_secs(2));
        store.set("key1".to_string(), "new".to_string(), Some(Duration::from_secs(1)));

        assert_eq!(store.get("key1"), Some("new".to_string()));
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_clear() {
        let (mut store, _) = store(10);

        set(&mut store, "key1", "value1");
        set(&mut store, "key2", "value2");
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.keys_by_recency().count(), 0);

        // Still usable after clearing
        set(&mut store, "key3", "value3");
        assert_eq!(store.get("key3"), Some("value3".to_string()));
    }

    #[test]
    fn test_store_stats() {
        let (mut store, _) = store(100);

        set(&mut store, "key1", "value1");
        store.get("key1"); // hit
        store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let (mut store, clock) = store(100);

        store.set("key1".to_string(), "value1".to_string(), Some(Duration::from_secs(1)));
        store.set("key2".to_string(), "value2".to_string(), Some(Duration::from_secs(10)));

        clock.advance(Duration::from_secs(2));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.keys_by_recency().collect::<Vec<_>>(), vec!["key2"]);
        assert!(store.get("key2").is_some());
    }

    #[test]
    fn test_store_keys_by_recency() {
        let (mut store, _) = store(10);

        set(&mut store, "a", "1");
        set(&mut store, "b", "2");
        set(&mut store, "c", "3");
        store.get("a");

        let order: Vec<&String> = store.keys_by_recency().collect();
        assert_eq!(order, vec!["a", "c", "b"]);
    }
}
