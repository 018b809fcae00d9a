//! Cache Entry Module
//!
//! Defines the record stored per key: value, expiry and recency handle together.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and TTL metadata.
///
/// Expiry is derived from `inserted_at + ttl` rather than stored as an
/// absolute instant, so very large TTLs cannot overflow `Instant`.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Monotonic instant of the last write
    pub inserted_at: Instant,
    /// Validity window measured from `inserted_at`
    pub ttl: Duration,
    /// Position in the recency order, unused by the concurrent cache
    pub(crate) slot: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry written at `now`.
    pub fn new(value: V, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: now,
            ttl,
            slot: 0,
        }
    }

    pub(crate) fn with_slot(mut self, slot: usize) -> Self {
        self.slot = slot;
        self
    }

    // == Refresh ==
    /// Replaces value and expiry in place, keeping the recency slot.
    pub fn refresh(&mut self, value: V, now: Instant, ttl: Duration) {
        self.value = value;
        self.inserted_at = now;
        self.ttl = ttl;
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry stays live while the elapsed time is at most its TTL and
    /// expires once the elapsed time strictly exceeds it. A zero TTL is
    /// expired from the moment it is written.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.ttl.is_zero() || now.saturating_duration_since(self.inserted_at) > self.ttl
    }

    // == Time To Live ==
    /// Returns the remaining validity window, zero once expired.
    pub fn ttl_remaining(&self, now: Instant) -> Duration {
        self.ttl
            .saturating_sub(now.saturating_duration_since(self.inserted_at))
    }
}
