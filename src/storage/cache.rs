//! Read-query result cache.
//!
//! Results are keyed by a SHA-256 digest of the query text and its bound
//! parameters, held in an LRU with a fixed time-to-live. Entries remember the
//! lowercased query so writes can drop the entries that mention the table
//! they touched.

use super::{Record, SqlValue};
use super::connection::acquire_lock;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default time-to-live for cached results (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default maximum number of cached results.
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// What a successful write does to cached results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationPolicy {
    /// Drop entries whose query mentions the written table.
    #[default]
    OnWrite,
    /// Never invalidate; entries live until their TTL elapses, so a read right
    /// after a write can return pre-write rows.
    TtlOnly,
}

impl InvalidationPolicy {
    /// Returns the policy as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OnWrite => "on_write",
            Self::TtlOnly => "ttl_only",
        }
    }

    /// Parses a policy from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "on_write" | "write" => Some(Self::OnWrite),
            "ttl_only" | "ttl" | "none" => Some(Self::TtlOnly),
            _ => None,
        }
    }
}

/// Cache tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Entry lifetime. Zero disables caching.
    pub ttl: Duration,
    /// Maximum number of entries.
    pub capacity: usize,
    /// Write invalidation policy.
    pub invalidation: InvalidationPolicy,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
            capacity: DEFAULT_CACHE_CAPACITY,
            invalidation: InvalidationPolicy::OnWrite,
        }
    }
}

impl CacheSettings {
    /// Settings with caching turned off.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            ttl: Duration::ZERO,
            capacity: 1,
            invalidation: InvalidationPolicy::OnWrite,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    query: String,
    rows: Arc<Vec<Record>>,
    expires_at: Instant,
}

/// LRU cache of read results with TTL expiry.
pub struct QueryCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl QueryCache {
    /// Creates a cache. A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            ttl,
        }
    }

    /// Computes the cache key for a query and its parameters.
    #[must_use]
    pub fn key(query: &str, params: &[SqlValue]) -> String {
        let mut hasher = Sha256::new();
        hasher.update((query.len() as u64).to_le_bytes());
        hasher.update(query.as_bytes());
        for param in params {
            param.hash_into(&mut hasher);
        }
        hex::encode(hasher.finalize())
    }

    /// Returns `true` when entries are kept at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Returns the configured TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Looks up a live entry, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<Arc<Vec<Record>>> {
        if !self.is_enabled() {
            return None;
        }
        let mut entries = acquire_lock(&self.entries);
        let state = entries
            .get(key)
            .map(|entry| (entry.expires_at > Instant::now(), Arc::clone(&entry.rows)));
        let hit = match state {
            Some((true, rows)) => Some(rows),
            Some((false, _)) => {
                entries.pop(key);
                None
            },
            None => None,
        };
        drop(entries);

        if hit.is_some() {
            metrics::counter!("gonetwork_query_cache_hits_total").increment(1);
        } else {
            metrics::counter!("gonetwork_query_cache_misses_total").increment(1);
        }
        hit
    }

    /// Stores a result under `key`.
    pub fn insert(&self, key: String, query: &str, rows: Arc<Vec<Record>>) {
        if !self.is_enabled() {
            return;
        }
        let entry = CacheEntry {
            query: query.to_lowercase(),
            rows,
            expires_at: Instant::now() + self.ttl,
        };
        let mut entries = acquire_lock(&self.entries);
        entries.put(key, entry);
        metrics::gauge!("gonetwork_query_cache_size").set(entries.len() as f64);
    }

    /// Drops every entry, returning how many were removed.
    pub fn invalidate_all(&self) -> usize {
        let mut entries = acquire_lock(&self.entries);
        let removed = entries.len();
        entries.clear();
        metrics::gauge!("gonetwork_query_cache_size").set(0.0);
        tracing::debug!(removed, "Query cache cleared");
        removed
    }

    /// Drops entries whose query mentions `table`, returning how many were removed.
    pub fn invalidate_table(&self, table: &str) -> usize {
        let table = table.to_lowercase();
        let mut entries = acquire_lock(&self.entries);
        let stale: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| mentions_table(&entry.query, &table))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        metrics::gauge!("gonetwork_query_cache_size").set(entries.len() as f64);
        tracing::debug!(table = %table, removed = stale.len(), "Query cache entries invalidated");
        stale.len()
    }

    /// Number of entries, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        acquire_lock(&self.entries).len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}

/// Whole-word, lowercase match of a table name inside a query.
fn mentions_table(query: &str, table: &str) -> bool {
    if table.is_empty() {
        return false;
    }
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    query.match_indices(table).any(|(start, _)| {
        let before = query[..start].chars().next_back();
        let after = query[start + table.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}
