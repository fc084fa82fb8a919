use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::application::repos::{ContentStore, StoreError, StoreQuery};

use super::config::CacheConfig;
use super::store::QueryStore;

/// Content store decorator that answers repeated queries from memory.
///
/// Each query carries its own revalidation window; a cached result older than
/// that window is never served. Failed fetches are not cached.
pub struct CachedContentStore {
    inner: Arc<dyn ContentStore>,
    results: Option<QueryStore>,
}

impl CachedContentStore {
    pub fn new(inner: Arc<dyn ContentStore>, config: &CacheConfig) -> Self {
        let results = config.enabled.then(|| QueryStore::new(config));
        Self { inner, results }
    }

    pub fn clear(&self) {
        if let Some(results) = &self.results {
            results.clear();
        }
    }
}

#[async_trait]
impl ContentStore for CachedContentStore {
    async fn fetch(&self, query: &StoreQuery) -> Result<Value, StoreError> {
        let Some(results) = &self.results else {
            return self.inner.fetch(query).await;
        };

        let key = query.cache_key();
        if let Some(value) = results.get(&key, query.revalidate) {
            debug!(query = query.name, "query served from cache");
            return Ok(value);
        }

        let value = self.inner.fetch(query).await?;
        results.set(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ContentStore for CountingStore {
        async fn fetch(&self, query: &StoreQuery) -> Result<Value, StoreError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::transport("offline"));
            }
            Ok(json!({ "query": query.name, "call": call }))
        }
    }

    fn listing() -> StoreQuery {
        StoreQuery::new("published_articles", "*", Duration::from_secs(60))
    }

    #[tokio::test(start_paused = true)]
    async fn serves_within_window_and_refetches_after() {
        let inner = Arc::new(CountingStore::default());
        let store = CachedContentStore::new(inner.clone(), &CacheConfig::default());

        let first = store.fetch(&listing()).await.expect("first fetch");
        let second = store.fetch(&listing()).await.expect("cached fetch");
        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        let third = store.fetch(&listing()).await.expect("refetch");
        assert_eq!(third["call"], 1);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn parameters_partition_the_cache() {
        let inner = Arc::new(CountingStore::default());
        let store = CachedContentStore::new(inner.clone(), &CacheConfig::default());

        let ruth = listing().param("slug", "ruth");
        let cobb = listing().param("slug", "cobb");
        store.fetch(&ruth).await.expect("ruth");
        store.fetch(&cobb).await.expect("cobb");
        store.fetch(&ruth).await.expect("ruth again");

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let inner = Arc::new(CountingStore {
            fail: true,
            ..Default::default()
        });
        let store = CachedContentStore::new(inner.clone(), &CacheConfig::default());

        assert!(store.fetch(&listing()).await.is_err());
        assert!(store.fetch(&listing()).await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn disabled_cache_passes_through() {
        let inner = Arc::new(CountingStore::default());
        let config = CacheConfig {
            enabled: false,
            ..Default::default()
        };
        let store = CachedContentStore::new(inner.clone(), &config);

        store.fetch(&listing()).await.expect("first");
        store.fetch(&listing()).await.expect("second");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
