use axum::body::Bytes;
use axum::http::HeaderValue;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

/// Bounded LRU map whose entries expire a fixed time after insertion.
/// Writes elsewhere never invalidate it; only expiry and `clear` do.
pub struct Cache<K, V> {
    inner: Mutex<LruCache<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K: std::hash::Hash + Eq, V: Clone> Cache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Cache {
            inner: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock().await;
        let expired = match inner.get(key) {
            Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            inner.pop(key);
        }
        None
    }

    pub async fn insert(&self, key: K, value: V) {
        self.inner.lock().await.put(key, CacheEntry::new(value, self.ttl));
    }

    pub async fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().await.pop(key).map(|entry| entry.value)
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// A fully rendered response body kept by the page cache.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub body: Bytes,
    pub content_type: Option<HeaderValue>,
}

/// Response cache keyed by request path and query.
pub type PageCache = Cache<String, CachedPage>;
