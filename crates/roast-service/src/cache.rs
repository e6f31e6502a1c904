//! In-memory TTL cache shared by all lookups

use crate::types::CacheStats;
use moka::future::Cache;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Kind of cached computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// Whether a login exists
    User,
    /// Serialized repository listing of a login
    Repos,
}

impl CacheKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Repos => "repos",
        }
    }
}

/// `kind:identifier`, e.g. `repos:octocat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKey<'a> {
    pub kind: CacheKind,
    pub id: &'a str,
}

impl<'a> CacheKey<'a> {
    pub fn user(id: &'a str) -> Self {
        Self {
            kind: CacheKind::User,
            id,
        }
    }

    pub fn repos(id: &'a str) -> Self {
        Self {
            kind: CacheKind::Repos,
            id,
        }
    }
}

impl fmt::Display for CacheKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Time-bounded memoization of lookup results.
///
/// Expiry is lazy: an entry older than the TTL stays in the map until the
/// next `get` for its key finds it, deletes it and reports a miss. There is
/// no capacity bound and no single-flight: two callers missing on the same
/// key at once both go to the source.
#[derive(Clone)]
pub struct LookupCache<V> {
    entries: Cache<String, CacheEntry<V>>,
    ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl<V> LookupCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().build(),
            ttl,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any. Deletes the entry when it has expired.
    pub async fn get(&self, key: &CacheKey<'_>) -> Option<V> {
        let key = key.to_string();
        match self.entries.get(&key).await {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value)
            }
            Some(_) => {
                self.entries.invalidate(&key).await;
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `value`, replacing any previous entry and restarting its TTL
    pub async fn set(&self, key: &CacheKey<'_>, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };
        self.entries.insert(key.to_string(), entry).await;
    }

    pub async fn delete(&self, key: &CacheKey<'_>) {
        self.entries.invalidate(&key.to_string()).await;
    }

    /// Whether the map still holds an entry for `key`, fresh or not
    pub fn contains(&self, key: &CacheKey<'_>) -> bool {
        self.entries.contains_key(&key.to_string())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
