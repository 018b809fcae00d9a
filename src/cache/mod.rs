//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, in two flavours:
//! a bounded store with LRU eviction and an unbounded concurrent TTL cache.

mod clock;
mod concurrent;
mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use concurrent::ConcurrentTtlCache;
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CacheStore;
