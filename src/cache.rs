//! Bounded, TTL-expiring memo of finished searches.
//!
//! Lookups take the read lock only; hit and miss counters are atomics so a
//! hit never serializes against other readers. Inserts and evictions take
//! the write lock. Eviction is oldest-insert-first.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;

use crate::config::CacheConfig;
use crate::options::SearchOptions;
use crate::rank::ScoredResult;

/// Normalized query plus every option that changes the result list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    limit: usize,
    use_fuzzy: bool,
    fuzzy_threshold: i32,
    use_nlp: bool,
    platforms: Vec<String>,
    all_platforms: bool,
    exclude_cross_platform: bool,
    pipeline_only: bool,
    pipeline_boost: u32,
    context_boosts: Vec<(String, u32)>,
}

impl CacheKey {
    /// `limit` is the effective limit, after the engine default is applied.
    pub fn new(signature: &str, opts: &SearchOptions, limit: usize) -> Self {
        let mut platforms: Vec<String> = opts.platforms.iter().map(|p| p.to_lowercase()).collect();
        platforms.sort();
        platforms.dedup();
        Self {
            query: signature.to_string(),
            limit,
            use_fuzzy: opts.use_fuzzy,
            fuzzy_threshold: opts.fuzzy_threshold,
            use_nlp: opts.use_nlp,
            platforms,
            all_platforms: opts.all_platforms,
            exclude_cross_platform: opts.exclude_cross_platform,
            pipeline_only: opts.pipeline_only,
            pipeline_boost: opts.pipeline_boost.to_bits(),
            // BTreeMap iteration is already sorted
            context_boosts: opts
                .context_boosts
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_bits()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    results: Vec<ScoredResult>,
    inserted: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    map: HashMap<CacheKey, CacheEntry>,
    /// Insertion order; may hold keys already removed from `map`.
    order: VecDeque<CacheKey>,
}

/// Counters reported by [`ResultCache::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
}

pub struct ResultCache {
    inner: RwLock<Inner>,
    capacity: usize,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ResultCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, config.ttl)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Vec<ScoredResult>> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &CacheKey, now: Instant) -> Option<Vec<ScoredResult>> {
        let inner = self.inner.read();
        let fresh = inner
            .map
            .get(key)
            .filter(|e| now.saturating_duration_since(e.inserted) < self.ttl);
        match fresh {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.results.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, key: CacheKey, results: Vec<ScoredResult>) {
        self.put_at(key, results, Instant::now());
    }

    pub(crate) fn put_at(&self, key: CacheKey, results: Vec<ScoredResult>, now: Instant) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.write();
        let entry = CacheEntry {
            results,
            inserted: now,
        };
        if inner.map.insert(key.clone(), entry).is_some() {
            // Re-inserted keys move to the back of the queue.
            inner.order.retain(|k| k != &key);
        }
        inner.order.push_back(key);

        while inner.map.len() > self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            if inner.map.remove(&oldest).is_some() {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    pub(crate) fn cleanup_expired_at(&self, now: Instant) -> usize {
        let mut inner = self.inner.write();
        let before = inner.map.len();
        let ttl = self.ttl;
        inner
            .map
            .retain(|_, e| now.saturating_duration_since(e.inserted) < ttl);
        let Inner { map, order } = &mut *inner;
        order.retain(|k| map.contains_key(k));
        let removed = before - map.len();
        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.map.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: self.len(),
        }
    }
}
