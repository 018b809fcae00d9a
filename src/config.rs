//! Configuration Module
//!
//! Handles loading cache settings from environment variables.

use std::env;
use std::time::Duration;

use serde::Serialize;

use crate::error::{CacheError, Result};

/// Default TTL in seconds shared by both cache variants.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Default capacity of the bounded cache.
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Maximum number of entries the bounded cache can hold
    pub max_size: usize,
    /// Default TTL in seconds for bounded-cache entries set without explicit TTL
    pub default_ttl: u64,
    /// Fixed TTL in seconds for every entry of the concurrent cache
    pub concurrent_ttl: u64,
    /// Sweep interval in seconds for the concurrent cache, 0 disables sweeping
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Bounded cache capacity (default: 1000)
    /// - `CACHE_DEFAULT_TTL` - Bounded cache default TTL in seconds (default: 3600)
    /// - `CONCURRENT_CACHE_TTL` - Concurrent cache TTL in seconds (default: 3600)
    /// - `CACHE_SWEEP_INTERVAL` - Concurrent cache sweep interval in seconds (default: 0, off)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: env_or("CACHE_MAX_SIZE", defaults.max_size),
            default_ttl: env_or("CACHE_DEFAULT_TTL", defaults.default_ttl),
            concurrent_ttl: env_or("CONCURRENT_CACHE_TTL", defaults.concurrent_ttl),
            sweep_interval: env_or("CACHE_SWEEP_INTERVAL", defaults.sweep_interval),
        }
    }

    /// Checks that the configuration can build a working cache.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_ttl_duration(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    pub fn concurrent_ttl_duration(&self) -> Duration {
        Duration::from_secs(self.concurrent_ttl)
    }

    /// Returns the sweep interval, or None when sweeping is disabled.
    pub fn sweep_interval_duration(&self) -> Option<Duration> {
        (self.sweep_interval > 0).then(|| Duration::from_secs(self.sweep_interval))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl: DEFAULT_TTL_SECS,
            concurrent_ttl: DEFAULT_TTL_SECS,
            sweep_interval: 0,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
