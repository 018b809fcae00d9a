//! Concurrent TTL Cache Module
//!
//! Unbounded cache with one fixed TTL per instance, safe to share between tasks.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};
use crate::config::Config;

#[derive(Debug)]
struct TtlState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    stats: CacheStats,
}

// == Concurrent TTL Cache ==
/// TTL-only cache guarded by a single async mutex.
///
/// Every operation holds the lock for its whole read-modify-write sequence,
/// so operations are linearizable in lock-acquisition order. There is no
/// capacity bound: expired entries leave on the next `get` of their key, on
/// [`ConcurrentTtlCache::purge_expired`], or through the sweep task in
/// [`crate::tasks::spawn_sweep_task`].
///
/// Share it behind an `Arc`. Values are returned as clones.
#[derive(Debug)]
pub struct ConcurrentTtlCache<K, V, C = SystemClock> {
    state: Mutex<TtlState<K, V>>,
    ttl: Duration,
    clock: C,
}

impl<K, V> ConcurrentTtlCache<K, V, SystemClock>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.concurrent_ttl_duration())
    }
}

impl<K, V, C> ConcurrentTtlCache<K, V, C>
where
    K: Eq + Hash,
    V: Clone,
    C: Clock,
{
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            state: Mutex::new(TtlState {
                entries: HashMap::new(),
                stats: CacheStats::new(),
            }),
            ttl,
            clock,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, expiring one TTL from now.
    ///
    /// Replaces any previous value for the key.
    pub async fn set(&self, key: K, value: V) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let now = self.clock.now();
        state.entries.insert(key, CacheEntry::new(value, now, self.ttl));
        state.stats.set_total_entries(state.entries.len());
    }

    // == Get ==
    /// Returns the value for `key` if present and unexpired.
    ///
    /// An expired entry is removed under the same lock acquisition that
    /// observed it.
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let now = self.clock.now();

        let expired = match state.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                let value = entry.value.clone();
                state.stats.record_hit();
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            state.entries.remove(key);
            state.stats.record_expirations(1);
            state.stats.set_total_entries(state.entries.len());
            debug!("dropped expired entry on read");
        }
        state.stats.record_miss();
        None
    }

    // == Purge Expired ==
    /// Removes every expired entry, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let now = self.clock.now();

        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired(now));
        let after = state.entries.len();

        let count = before - after;
        state.stats.record_expirations(count);
        state.stats.set_total_entries(after);
        count
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    /// Number of stored entries, including expired ones not yet observed.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
