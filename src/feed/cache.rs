//! Time-boxed response cache keyed by request signature.
//!
//! Entries are replaced on refresh and never evicted. A failed fetch leaves
//! the map untouched and the error goes straight back to the caller.

use super::StatsFeed;
use crate::error::StatsError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub fetched_at: Instant,
    pub payload: Value,
}

impl CacheEntry {
    pub fn is_live(&self, expiry: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < expiry
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

pub struct ResponseCache {
    inner: Mutex<Inner>,
    expiry: Duration,
}

/// Cache key for a URL and its query params. Params are sorted so the
/// caller's insertion order never produces a different key, and the key is
/// the JSON text of `[url, [[name, value], ...]]` so separators inside a
/// name or value cannot alias another request.
pub fn cache_key(url: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();
    let pairs: Vec<Value> = sorted.iter().map(|(k, v)| json!([k, v])).collect();
    json!([url, pairs]).to_string()
}

impl ResponseCache {
    pub fn new(expiry: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            expiry,
        }
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached payload for `url` + `params` if it is still live,
    /// otherwise run `fetcher`, store its result and return it.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        url: &str,
        params: &[(String, String)],
        fetcher: F,
    ) -> Result<Value, StatsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, StatsError>>,
    {
        let key = cache_key(url, params);

        // Lock is released before the fetch is awaited.
        {
            let mut inner = self.lock();
            let now = Instant::now();
            let hit = inner
                .entries
                .get(&key)
                .filter(|e| e.is_live(self.expiry, now))
                .map(|e| e.payload.clone());
            if let Some(payload) = hit {
                inner.hits += 1;
                debug!(key = %key, "cache hit");
                return Ok(payload);
            }
            inner.misses += 1;
        }

        debug!(key = %key, "cache miss, fetching");
        let payload = fetcher().await?;

        let entry = CacheEntry {
            key: key.clone(),
            fetched_at: Instant::now(),
            payload: payload.clone(),
        };
        self.lock().entries.insert(key, entry);
        Ok(payload)
    }

    /// Snapshot of a stored entry, live or not.
    pub fn entry(&self, url: &str, params: &[(String, String)]) -> Option<CacheEntry> {
        self.lock().entries.get(&cache_key(url, params)).cloned()
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            entries: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }
}

/// A [`StatsFeed`] that answers from a shared [`ResponseCache`] before
/// falling through to the wrapped feed.
pub struct CachedFeed<F> {
    inner: F,
    cache: Arc<ResponseCache>,
}

impl<F: StatsFeed> CachedFeed<F> {
    pub fn new(inner: F, cache: Arc<ResponseCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<F: StatsFeed> StatsFeed for CachedFeed<F> {
    fn endpoint_url(&self, endpoint: &str) -> String {
        self.inner.endpoint_url(endpoint)
    }

    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, StatsError> {
        let url = self.inner.endpoint_url(endpoint);
        self.cache
            .get_or_fetch(&url, params, || self.inner.fetch(endpoint, params))
            .await
    }
}
