//! Per-source TTL cache
//!
//! In-memory cache for expensive or rate-limited fetches, with a
//! heterogeneous TTL per entry. Staleness is checked lazily at read time by
//! the orchestrator; there is no background eviction, so all mutation stays
//! on the orchestrator's call path. A fetch failure never touches the stored
//! entry: a transient outage degrades freshness, not availability.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

/// Freshness of a returned cache value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Stale,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    fetched_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn status(&self, now: DateTime<Utc>) -> CacheStatus {
        let age = now.signed_duration_since(self.fetched_at);
        if age.num_milliseconds() > self.ttl.as_millis() as i64 {
            CacheStatus::Stale
        } else {
            CacheStatus::Fresh
        }
    }
}

/// Name-keyed TTL cache for source values
#[derive(Default)]
pub struct SourceCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached value for a source, with its freshness.
    ///
    /// Returns `None` on a miss; a miss always forces a fetch.
    pub fn get(&self, name: &str) -> Option<(Value, CacheStatus)> {
        self.get_at(name, Utc::now())
    }

    fn get_at(&self, name: &str, now: DateTime<Utc>) -> Option<(Value, CacheStatus)> {
        let entries = self.entries.read();
        entries
            .get(name)
            .map(|entry| (entry.value.clone(), entry.status(now)))
    }

    /// Store a successful fetch result, replacing any prior entry atomically
    pub fn put(&self, name: &str, value: Value, ttl: Duration) {
        let mut entries = self.entries.write();
        entries.insert(
            name.to_string(),
            CacheEntry {
                value,
                fetched_at: Utc::now(),
                ttl,
            },
        );
        debug!("Cached {} (ttl {}s)", name, ttl.as_secs());
    }

    /// Counts of total/fresh/stale entries
    pub fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let entries = self.entries.read();

        let total = entries.len();
        let fresh = entries
            .values()
            .filter(|e| e.status(now) == CacheStatus::Fresh)
            .count();

        CacheStats {
            total,
            fresh,
            stale: total - fresh,
        }
    }

    /// Drop every entry. Test helper; production code never resets the cache.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total: usize,
    pub fresh: usize,
    pub stale: usize,
}
