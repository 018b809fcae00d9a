//! Memo Cache - in-process caches for memoizing expensive computations
//!
//! Provides a bounded cache with TTL expiration and LRU eviction, a
//! memoization wrapper over it, and an unbounded TTL cache for concurrent
//! async callers.

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod memoize;
pub mod tasks;

pub use cache::{CacheStats, CacheStore, Clock, ConcurrentTtlCache, ManualClock, SystemClock};
pub use config::Config;
pub use error::{CacheError, Result};
pub use key::{CacheKey, CacheKeyBuilder, KeyPart};
pub use memoize::Memoizer;
pub use tasks::{spawn_configured_sweep_task, spawn_sweep_task};
