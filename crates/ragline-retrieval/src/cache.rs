//! In-memory cache with TTL expiry and size-bounded eviction.
//!
//! Implements the shared `Cache` collaborator contract: reads and writes are
//! safe under concurrent access, absence is `None`. There is no at-most-once
//! computation guarantee; two tasks missing the same key may both recompute
//! it, which is acceptable for this workload.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ragline_core::traits::Cache;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub evictions: u64,
    pub expirations: u64,
}

struct CacheItem {
    value: String,
    expires_at: Option<Instant>,
    last_access: Instant,
}

impl CacheItem {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now > deadline)
    }
}

struct Inner {
    map: HashMap<String, CacheItem>,
    stats: CacheStats,
}

pub struct MemoryCache {
    inner: Mutex<Inner>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner { map: HashMap::new(), stats: CacheStats::default() }),
            max_entries: max_entries.max(1),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().expect("cache lock poisoned").stats
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        let expired = match inner.map.get(key) {
            None => {
                inner.stats.misses += 1;
                return None;
            }
            Some(item) => item.is_expired(now),
        };
        if expired {
            inner.map.remove(key);
            inner.stats.expirations += 1;
            inner.stats.misses += 1;
            return None;
        }
        inner.stats.hits += 1;
        let item = inner.map.get_mut(key)?;
        item.last_access = now;
        Some(item.value.clone())
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) {
        let now = Instant::now();
        let expires_at = if ttl_secs > 0 {
            Some(now + Duration::from_secs(ttl_secs))
        } else {
            None
        };
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.map.insert(
            key.to_string(),
            CacheItem { value, expires_at, last_access: now },
        );
        inner.stats.sets += 1;

        while inner.map.len() > self.max_entries {
            let oldest = inner
                .map
                .iter()
                .min_by_key(|(_, item)| item.last_access)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    inner.map.remove(&k);
                    inner.stats.evictions += 1;
                }
                None => break,
            }
        }
    }
}
