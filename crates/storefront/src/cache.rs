//! Keyed query cache with a per-lookup time-to-live.
//!
//! Entries remember when they were fetched; a lookup reuses an entry only if
//! it is younger than the TTL passed to that lookup. Failed fetches are never
//! stored, so the next lookup retries. A fetch that was already running when
//! an invalidation happened returns its value but does not store it.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use moka::future::Cache;
use tracing::debug;

struct CacheEntry<V> {
    value: Arc<V>,
    fetched_at: Instant,
}

impl<V> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            fetched_at: self.fetched_at,
        }
    }
}

/// Query results shared across requests.
#[derive(Clone)]
pub struct QueryCache<V> {
    entries: Cache<String, CacheEntry<V>>,
    default_ttl: Duration,
    /// Bumped by every invalidation.
    generation: Arc<AtomicU64>,
}

impl<V: Send + Sync + 'static> QueryCache<V> {
    /// Create an empty cache whose lookups default to `default_ttl`.
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().build(),
            default_ttl,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Return the cached value for `key` if it is younger than `ttl`,
    /// otherwise run `fetch` and store its result.
    ///
    /// # Errors
    ///
    /// Propagates the error from `fetch`; nothing is cached in that case.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(entry) = self.entries.get(key).await
            && entry.fetched_at.elapsed() < ttl
        {
            debug!(key, "Cache hit");
            return Ok(entry.value);
        }

        debug!(key, "Cache miss");
        let generation = self.generation.load(Ordering::SeqCst);
        let fetched_at = Instant::now();
        let value = Arc::new(fetch().await?);

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(key, "Invalidated during fetch, not storing");
            return Ok(value);
        }
        self.entries
            .insert(
                key.to_string(),
                CacheEntry {
                    value: Arc::clone(&value),
                    fetched_at,
                },
            )
            .await;
        Ok(value)
    }

    /// [`Self::get_or_fetch`] with the default TTL.
    ///
    /// # Errors
    ///
    /// Propagates the error from `fetch`.
    pub async fn get_or_fetch_default<F, Fut, E>(&self, key: &str, fetch: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_or_fetch(key, self.default_ttl, fetch).await
    }

    /// Drop the entry for `key`. Unknown keys are ignored.
    pub async fn invalidate(&self, key: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.invalidate(key).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    async fn counted(
        cache: &QueryCache<u32>,
        key: &str,
        ttl: Duration,
        calls: &AtomicUsize,
    ) -> Arc<u32> {
        cache
            .get_or_fetch(key, ttl, || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(u32::try_from(n).unwrap())
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_fresh_entry_is_reused() {
        let cache = QueryCache::new(TTL);
        let calls = AtomicUsize::new(0);

        let first = counted(&cache, "products", TTL, &calls).await;
        let second = counted(&cache, "products", TTL, &calls).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let cache = QueryCache::new(TTL);
        let calls = AtomicUsize::new(0);

        counted(&cache, "products", Duration::ZERO, &calls).await;
        counted(&cache, "products", Duration::ZERO, &calls).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = QueryCache::new(TTL);
        let calls = AtomicUsize::new(0);

        let sale = counted(&cache, "homepage-sale", TTL, &calls).await;
        let new = counted(&cache, "homepage-new", TTL, &calls).await;

        assert_eq!(*sale, 0);
        assert_eq!(*new, 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = QueryCache::new(TTL);
        let calls = AtomicUsize::new(0);

        counted(&cache, "products", TTL, &calls).await;
        cache.invalidate("products").await;
        cache.invalidate("never-stored").await;
        let after = counted(&cache, "products", TTL, &calls).await;

        assert_eq!(*after, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_overlapping_invalidation_is_not_stored() {
        let cache = QueryCache::new(TTL);
        let calls = AtomicUsize::new(0);

        let stale = cache
            .get_or_fetch("products", TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                // A write lands while the read is in flight.
                cache.invalidate("products").await;
                Ok::<_, String>(0)
            })
            .await
            .unwrap();
        assert_eq!(*stale, 0);

        let fresh = counted(&cache, "products", TTL, &calls).await;
        assert_eq!(*fresh, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: QueryCache<u32> = QueryCache::new(TTL);

        let failed = cache
            .get_or_fetch_default("products", || async { Err::<u32, _>("offline") })
            .await;
        assert_eq!(failed.unwrap_err(), "offline");

        let value = cache
            .get_or_fetch_default("products", || async { Ok::<_, &str>(7) })
            .await
            .unwrap();
        assert_eq!(*value, 7);
    }
}
