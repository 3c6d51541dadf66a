//! Background tasks

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::OrderCache;

/// Periodically drop expired cache entries. Expired entries already
/// read as misses; this only reclaims their memory.
pub fn spawn_cache_sweeper(cache: Arc<OrderCache>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let before = cache.len();
            cache.sweep();
            let after = cache.len();
            if before != after {
                debug!(dropped = before - after, remaining = after, "cache sweep");
            }
        }
    });
}
