//! TTL Sweep Task
//!
//! Background task that periodically purges expired entries from a
//! [`ConcurrentTtlCache`], so keys that are never read again still leave.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{Clock, ConcurrentTtlCache};
use crate::config::Config;

/// Spawns a background task that periodically purges expired cache entries.
///
/// The task runs until aborted, sleeping for `interval` between sweeps and
/// taking the cache lock once per sweep.
///
/// # Returns
/// A JoinHandle for the spawned task; abort it when the cache's owner shuts down.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ConcurrentTtlCache::new(Duration::from_secs(3600)));
/// let sweep_handle = spawn_sweep_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<K, V, C>(
    cache: Arc<ConcurrentTtlCache<K, V, C>>,
    interval: Duration,
) -> JoinHandle<()>
where
    K: Eq + Hash + Send + 'static,
    V: Clone + Send + 'static,
    C: Clock + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(?interval, "Starting TTL sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}

/// Spawns the sweep task only when `config.sweep_interval` is non-zero.
pub fn spawn_configured_sweep_task<K, V, C>(
    cache: Arc<ConcurrentTtlCache<K, V, C>>,
    config: &Config,
) -> Option<JoinHandle<()>>
where
    K: Eq + Hash + Send + 'static,
    V: Clone + Send + 'static,
    C: Clock + Send + Sync + 'static,
{
    config
        .sweep_interval_duration()
        .map(|interval| spawn_sweep_task(cache, interval))
}
