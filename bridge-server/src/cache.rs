//! In-memory TTL cache

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    storage::CacheStore,
    time::{Clock, SystemClock},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, trace};

const DEFAULT_CAPACITY: usize = 1024;

struct CacheEntry {
    value: Bytes,
    expires_at: DateTime<Utc>,
}

/// Process-local [`CacheStore`].
///
/// Entries expire after their TTL and are evicted least-recently-used once
/// `capacity` is reached. Expired entries are dropped lazily on lookup.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCacheStore {
    /// Create a cache holding at most `capacity` entries (0 falls back to the default).
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    /// Create a cache that reads time from `clock`.
    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            clock,
        }
    }

    /// Number of entries currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > now => {
                trace!("Cache hit");
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            debug!("Dropping expired cache entry");
            entries.pop(key);
        }

        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.entries.lock().await;
        entries.put(key.to_string(), CacheEntry { value, expires_at });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::time::ManualClock;

    fn store_with_clock(capacity: usize) -> (MemoryCacheStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let store = MemoryCacheStore::with_clock(capacity, clock.clone());
        (store, clock)
    }

    #[tokio::test]
    async fn test_get_returns_value_before_expiry() {
        let (store, clock) = store_with_clock(8);
        store
            .set("k", Bytes::from_static(b"v"), Duration::from_secs(300))
            .await
            .unwrap();

        clock.advance(chrono::Duration::seconds(299));
        assert_eq!(store.get("k").await.unwrap(), Some(Bytes::from_static(b"v")));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let (store, clock) = store_with_clock(8);
        store
            .set("k", Bytes::from_static(b"v"), Duration::from_secs(300))
            .await
            .unwrap();

        clock.advance(chrono::Duration::seconds(300));
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_replaces_whole_value() {
        let (store, _clock) = store_with_clock(8);
        store
            .set("k", Bytes::from_static(b"first"), Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set("k", Bytes::from_static(b"second"), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            store.get("k").await.unwrap(),
            Some(Bytes::from_static(b"second"))
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_least_recently_used_entry_is_evicted() {
        let (store, _clock) = store_with_clock(2);
        let ttl = Duration::from_secs(60);
        store.set("a", Bytes::from_static(b"1"), ttl).await.unwrap();
        store.set("b", Bytes::from_static(b"2"), ttl).await.unwrap();

        // Touch "a" so that "b" becomes the eviction candidate.
        assert!(store.get("a").await.unwrap().is_some());
        store.set("c", Bytes::from_static(b"3"), ttl).await.unwrap();

        assert!(store.get("a").await.unwrap().is_some());
        assert!(store.get("b").await.unwrap().is_none());
        assert!(store.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_capacity_falls_back_to_default() {
        let store = MemoryCacheStore::new(0);
        store
            .set("k", Bytes::from_static(b"v"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);
    }
}
