//! Time-bounded storage for raw query results.

use std::sync::RwLock;
use std::time::Duration;

use lru::LruCache;
use metrics::counter;
use serde_json::Value;
use tokio::time::Instant;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

pub(crate) const METRIC_CACHE_HIT: &str = "nostalgia_cache_hits_total";
pub(crate) const METRIC_CACHE_MISS: &str = "nostalgia_cache_misses_total";
pub(crate) const METRIC_CACHE_EVICT: &str = "nostalgia_cache_evictions_total";

#[derive(Clone)]
struct CachedResult {
    fetched_at: Instant,
    value: Value,
}

/// LRU map of query key to result, stamped with the fetch time.
///
/// A lookup names the freshness window it tolerates; entries older than that
/// are dropped instead of returned.
pub struct QueryStore {
    results: RwLock<LruCache<String, CachedResult>>,
}

impl QueryStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            results: RwLock::new(LruCache::new(config.max_entries_non_zero())),
        }
    }

    pub fn get(&self, key: &str, max_age: Duration) -> Option<Value> {
        let mut results = rw_write(&self.results, SOURCE, "get");
        let fresh = match results.get(key) {
            Some(entry) if entry.fetched_at.elapsed() < max_age => Some(entry.value.clone()),
            Some(_) => {
                results.pop(key);
                None
            }
            None => None,
        };
        drop(results);

        match fresh {
            Some(value) => {
                counter!(METRIC_CACHE_HIT).increment(1);
                Some(value)
            }
            None => {
                counter!(METRIC_CACHE_MISS).increment(1);
                None
            }
        }
    }

    pub fn set(&self, key: String, value: Value) {
        let entry = CachedResult {
            fetched_at: Instant::now(),
            value,
        };
        let evicted = rw_write(&self.results, SOURCE, "set").push(key.clone(), entry);
        if matches!(evicted, Some((evicted_key, _)) if evicted_key != key) {
            counter!(METRIC_CACHE_EVICT).increment(1);
        }
    }

    pub fn clear(&self) {
        rw_write(&self.results, SOURCE, "clear").clear();
    }

    pub fn len(&self) -> usize {
        rw_read(&self.results, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
