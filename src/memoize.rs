//! Memoization Module
//!
//! Wraps a bounded [`CacheStore`] so expensive computations run at most once
//! per key and validity window.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore, Clock, SystemClock};
use crate::config::{Config, DEFAULT_TTL_SECS};
use crate::error::Result;
use crate::key::CacheKey;

// == Memoizer ==
/// Memoizes computation results in an owned, lock-guarded [`CacheStore`].
///
/// One mutex covers the whole store (index, recency order and expiry), and
/// it is never held while a computation runs. Two callers missing on the
/// same key at the same time both compute and the later write wins; only
/// wrap pure or idempotent computations.
///
/// Share a memoizer behind an `Arc` and tie it to the lifetime of whatever
/// component owns the memoized calls.
#[derive(Debug)]
pub struct Memoizer<V, C = SystemClock> {
    store: Mutex<CacheStore<CacheKey, V, C>>,
    ttl: Duration,
}

impl<V: Clone> Memoizer<V, SystemClock> {
    /// Creates a memoizer holding up to `max_size` results for one hour each.
    pub fn new(max_size: usize) -> Result<Self> {
        let ttl = Duration::from_secs(DEFAULT_TTL_SECS);
        Ok(Self::from_store(CacheStore::new(max_size, ttl)?))
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::from_store(CacheStore::from_config(config)?))
    }
}

impl<V: Clone, C: Clock> Memoizer<V, C> {
    /// Wraps an existing store. Results are kept for the store's default TTL.
    pub fn from_store(store: CacheStore<CacheKey, V, C>) -> Self {
        let ttl = store.default_ttl();
        Self {
            store: Mutex::new(store),
            ttl,
        }
    }

    /// Sets how long computed results stay valid.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    // == Get Or Compute ==
    /// Returns the cached result for `key`, or runs `compute` and caches it.
    ///
    /// On a hit `compute` is not invoked.
    pub fn get_or_compute<F>(&self, key: &CacheKey, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.lookup(key) {
            return value;
        }
        debug!(%key, "memoized call missed, computing");
        let value = compute();
        self.remember(key, value.clone());
        value
    }

    /// Fallible form of [`Memoizer::get_or_compute`].
    ///
    /// An `Err` from `compute` is returned as is and nothing is cached.
    pub fn try_get_or_compute<F, E>(&self, key: &CacheKey, compute: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
    {
        if let Some(value) = self.lookup(key) {
            return Ok(value);
        }
        debug!(%key, "memoized call missed, computing");
        let value = compute()?;
        self.remember(key, value.clone());
        Ok(value)
    }

    /// Async form of [`Memoizer::get_or_compute`].
    pub async fn get_or_compute_async<F, Fut>(&self, key: &CacheKey, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(value) = self.lookup(key) {
            return value;
        }
        debug!(%key, "memoized call missed, computing");
        let value = compute().await;
        self.remember(key, value.clone());
        value
    }

    /// Async form of [`Memoizer::try_get_or_compute`].
    pub async fn try_get_or_compute_async<F, Fut, E>(
        &self,
        key: &CacheKey,
        compute: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.lookup(key) {
            return Ok(value);
        }
        debug!(%key, "memoized call missed, computing");
        let value = compute().await?;
        self.remember(key, value.clone());
        Ok(value)
    }

    /// Returns the cached result without computing anything.
    pub fn lookup(&self, key: &CacheKey) -> Option<V> {
        self.store.lock().get(key)
    }

    /// Drops the cached result for `key`.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.store.lock().delete(key)
    }

    pub fn clear(&self) {
        self.store.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn remember(&self, key: &CacheKey, value: V) {
        self.store.lock().set(key.clone(), value, Some(self.ttl));
    }
}
