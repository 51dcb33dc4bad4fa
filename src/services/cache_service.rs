//! Cache Service
//!
//! In-memory LRU caching for the search pipeline. Four independent layers
//! (search results, activity lists, embeddings, query analyses) share one
//! generic cache type with size, entry-count, and TTL bounds.
//!
//! ## Features
//! - Per-layer `{max_bytes, default_ttl, max_entries}` limits
//! - LRU eviction with an access-count tie-break
//! - Deterministic search keys (field order never causes a miss)
//! - Tag-based layer invalidation
//! - Hit/miss accounting per layer
//! - Warmup of the result layer for a fixed query list
//!
//! Nothing here persists: every layer is rebuilt from an empty state on
//! process start.

use crate::models::activity::Activity;
use crate::models::context::SearchContext;
use crate::models::search::IntelligentSearchResult;
use crate::services::query_analysis::QueryIntent;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

// Default layer limits. Sizes are estimates of the serialized payload, so
// the byte bound is approximate but stable.
const SEARCH_RESULTS_BYTES: usize = 512 * 1024;
const SEARCH_RESULTS_TTL_SECS: u64 = 300;
const SEARCH_RESULTS_ENTRIES: usize = 128;

const ACTIVITY_LIST_BYTES: usize = 256 * 1024;
const ACTIVITY_LIST_TTL_SECS: u64 = 600;
const ACTIVITY_LIST_ENTRIES: usize = 64;

const EMBEDDING_BYTES: usize = 1024 * 1024;
const EMBEDDING_TTL_SECS: u64 = 3600;
const EMBEDDING_ENTRIES: usize = 512;

const QUERY_ANALYSIS_BYTES: usize = 128 * 1024;
const QUERY_ANALYSIS_TTL_SECS: u64 = 900;
const QUERY_ANALYSIS_ENTRIES: usize = 256;

/// Queries pre-run against an empty cache at startup.
const WARMUP_QUERIES: &[&str] = &[
    "nature parks",
    "local food",
    "museums and culture",
    "shopping",
    "family friendly activities",
    "scenic views",
];

#[derive(Debug, Clone)]
pub struct CacheLimits {
    pub max_bytes: usize,
    pub default_ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            max_bytes: SEARCH_RESULTS_BYTES,
            default_ttl: Duration::from_secs(SEARCH_RESULTS_TTL_SECS),
            max_entries: SEARCH_RESULTS_ENTRIES,
        }
    }
}

/// One cached payload with its bookkeeping. Owned by exactly one cache
/// instance; removed on expiry, eviction, or explicit delete.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub created_at: Instant,
    pub last_accessed: Instant,
    pub access_count: u64,
    pub ttl: Duration,
    pub tags: Vec<String>,
    pub estimated_bytes: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub bytes: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }
}

/// Fixed-capacity LRU cache. `get` enforces TTL; `set` evicts until both
/// the entry and byte bounds hold.
pub struct LruCache<T: Clone + Serialize> {
    entries: HashMap<String, CacheEntry<T>>,
    limits: CacheLimits,
    layer_tags: Vec<String>,
    bytes: usize,
    hits: u64,
    misses: u64,
}

impl<T: Clone + Serialize> LruCache<T> {
    pub fn new(limits: CacheLimits, layer_tags: &[&str]) -> Self {
        Self {
            entries: HashMap::new(),
            limits,
            layer_tags: layer_tags.iter().map(|t| t.to_string()).collect(),
            bytes: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Insert under `key`, evicting as needed. A payload larger than the
    /// whole layer is refused.
    pub fn set(&mut self, key: &str, value: T, ttl: Option<Duration>, tags: Vec<String>) {
        let estimated_bytes = serde_json::to_vec(&value).map(|v| v.len()).unwrap_or(64);
        if estimated_bytes > self.limits.max_bytes {
            log::warn!(
                "cache entry '{}' ({} bytes) exceeds the layer limit, not cached",
                key,
                estimated_bytes
            );
            return;
        }

        self.remove(key);
        self.purge_expired();

        while self.entries.len() + 1 > self.limits.max_entries
            || self.bytes + estimated_bytes > self.limits.max_bytes
        {
            if !self.evict_one() {
                break;
            }
        }

        let now = Instant::now();
        self.bytes += estimated_bytes;
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                data: value,
                created_at: now,
                last_accessed: now,
                access_count: 0,
                ttl: ttl.unwrap_or(self.limits.default_ttl),
                tags,
                estimated_bytes,
            },
        );
    }

    /// Fetch a live entry. Expired entries are removed and reported as
    /// misses; hits refresh recency and bump the access counter.
    pub fn get(&mut self, key: &str) -> Option<T> {
        match self.entries.get_mut(key) {
            Some(entry) if entry.created_at.elapsed() <= entry.ttl => {
                entry.last_accessed = Instant::now();
                entry.access_count += 1;
                self.hits += 1;
                Some(entry.data.clone())
            }
            Some(_) => {
                self.remove(key);
                self.misses += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        if let Some(entry) = self.entries.remove(key) {
            self.bytes = self.bytes.saturating_sub(entry.estimated_bytes);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.bytes = 0;
    }

    /// Drop every expired entry. Safe to call from a maintenance loop.
    pub fn purge_expired(&mut self) {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.created_at.elapsed() > entry.ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            self.remove(&key);
        }
    }

    /// Evict the least-recently-used entry, breaking ties on the lowest
    /// access count. Returns false when the cache is already empty.
    fn evict_one(&mut self) -> bool {
        let victim = self
            .entries
            .iter()
            .min_by(|(_, a), (_, b)| {
                a.last_accessed
                    .cmp(&b.last_accessed)
                    .then_with(|| a.access_count.cmp(&b.access_count))
            })
            .map(|(key, _)| key.clone());

        match victim {
            Some(key) => {
                log::debug!("evicting cache entry '{}'", key);
                self.remove(&key)
            }
            None => false,
        }
    }

    pub fn layer_tags(&self) -> &[String] {
        &self.layer_tags
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
            bytes: self.bytes,
        }
    }
}

/// The four cache layers behind the search pipeline. One instance per
/// process, owned by the orchestration layer and passed by handle.
pub struct CacheManager {
    search_results: LruCache<Vec<IntelligentSearchResult>>,
    activity_lists: LruCache<Vec<Activity>>,
    embeddings: LruCache<Vec<f32>>,
    query_analyses: LruCache<QueryIntent>,
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheManager {
    pub fn new() -> Self {
        Self {
            search_results: LruCache::new(
                CacheLimits {
                    max_bytes: SEARCH_RESULTS_BYTES,
                    default_ttl: Duration::from_secs(SEARCH_RESULTS_TTL_SECS),
                    max_entries: SEARCH_RESULTS_ENTRIES,
                },
                &["search", "results"],
            ),
            activity_lists: LruCache::new(
                CacheLimits {
                    max_bytes: ACTIVITY_LIST_BYTES,
                    default_ttl: Duration::from_secs(ACTIVITY_LIST_TTL_SECS),
                    max_entries: ACTIVITY_LIST_ENTRIES,
                },
                &["activities"],
            ),
            embeddings: LruCache::new(
                CacheLimits {
                    max_bytes: EMBEDDING_BYTES,
                    default_ttl: Duration::from_secs(EMBEDDING_TTL_SECS),
                    max_entries: EMBEDDING_ENTRIES,
                },
                &["embeddings", "vector"],
            ),
            query_analyses: LruCache::new(
                CacheLimits {
                    max_bytes: QUERY_ANALYSIS_BYTES,
                    default_ttl: Duration::from_secs(QUERY_ANALYSIS_TTL_SECS),
                    max_entries: QUERY_ANALYSIS_ENTRIES,
                },
                &["query", "intent"],
            ),
        }
    }

    /// Deterministic key for a search-result entry. Interests are sorted so
    /// two contexts that differ only in array order share a key.
    pub fn search_cache_key(query: &str, context: &SearchContext) -> String {
        let mut interests: Vec<String> =
            context.interests.iter().map(|i| i.to_lowercase()).collect();
        interests.sort();

        format!(
            "search:{}|interests:{}|weather:{}|time:{}|budget:{}|group:{}|days:{}",
            query.trim().to_lowercase(),
            interests.join(","),
            context.weather.as_str(),
            context.time_of_day.as_str(),
            context.budget.as_str(),
            context.group_size,
            context.trip_duration_days,
        )
    }

    pub fn get_search_results(&mut self, key: &str) -> Option<Vec<IntelligentSearchResult>> {
        self.search_results.get(key)
    }

    pub fn set_search_results(&mut self, key: &str, results: Vec<IntelligentSearchResult>) {
        self.search_results.set(key, results, None, Vec::new());
    }

    pub fn get_activity_list(&mut self, key: &str) -> Option<Vec<Activity>> {
        self.activity_lists.get(key)
    }

    pub fn set_activity_list(&mut self, key: &str, activities: Vec<Activity>) {
        self.activity_lists.set(key, activities, None, Vec::new());
    }

    pub fn get_embedding(&mut self, text: &str) -> Option<Vec<f32>> {
        self.embeddings.get(text)
    }

    pub fn set_embedding(&mut self, text: &str, embedding: Vec<f32>) {
        self.embeddings.set(text, embedding, None, Vec::new());
    }

    pub fn get_query_analysis(&mut self, query: &str) -> Option<QueryIntent> {
        self.query_analyses.get(query)
    }

    pub fn set_query_analysis(&mut self, query: &str, intent: QueryIntent) {
        self.query_analyses.set(query, intent, None, Vec::new());
    }

    /// Clear every layer whose tags intersect the given set. Coarse:
    /// layers are cleared whole, there is no per-entry tag index.
    pub fn invalidate_by_tags(&mut self, tags: &[&str]) {
        if intersects(self.search_results.layer_tags(), tags) {
            self.search_results.clear();
        }
        if intersects(self.activity_lists.layer_tags(), tags) {
            self.activity_lists.clear();
        }
        if intersects(self.embeddings.layer_tags(), tags) {
            self.embeddings.clear();
        }
        if intersects(self.query_analyses.layer_tags(), tags) {
            self.query_analyses.clear();
        }
    }

    /// Pre-populate the result layer for the fixed warmup queries under a
    /// default context. Individual failures are logged and skipped.
    pub async fn warmup<F, Fut>(&mut self, search_fn: F)
    where
        F: Fn(String, SearchContext) -> Fut,
        Fut: Future<Output = Result<Vec<IntelligentSearchResult>, crate::services::providers::BoxError>>,
    {
        let context = SearchContext::default();
        let lookups = WARMUP_QUERIES
            .iter()
            .map(|query| search_fn(query.to_string(), context.clone()));
        let outcomes = futures::future::join_all(lookups).await;

        for (query, outcome) in WARMUP_QUERIES.iter().zip(outcomes) {
            match outcome {
                Ok(results) => {
                    let key = Self::search_cache_key(query, &context);
                    self.set_search_results(&key, results);
                }
                Err(e) => {
                    log::warn!("cache warmup skipped '{}': {}", query, e);
                }
            }
        }
    }

    pub fn stats(&self) -> HashMap<&'static str, CacheStats> {
        HashMap::from([
            ("search_results", self.search_results.stats()),
            ("activity_lists", self.activity_lists.stats()),
            ("embeddings", self.embeddings.stats()),
            ("query_analyses", self.query_analyses.stats()),
        ])
    }
}

fn intersects(layer_tags: &[String], tags: &[&str]) -> bool {
    layer_tags.iter().any(|t| tags.contains(&t.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_bound_holds() {
        let mut cache: LruCache<u32> = LruCache::new(
            CacheLimits {
                max_bytes: 1024,
                default_ttl: Duration::from_secs(60),
                max_entries: 3,
            },
            &["test"],
        );

        for i in 0..10u32 {
            cache.set(&format!("k{}", i), i, None, Vec::new());
        }
        assert!(cache.len() <= 3);
        assert!(cache.stats().bytes <= 1024);
    }

    #[test]
    fn test_lru_evicts_least_recently_used() {
        let mut cache: LruCache<u32> = LruCache::new(
            CacheLimits {
                max_bytes: 1024,
                default_ttl: Duration::from_secs(60),
                max_entries: 2,
            },
            &["test"],
        );

        cache.set("old", 1, None, Vec::new());
        cache.set("fresh", 2, None, Vec::new());
        // Touch "old" so "fresh" becomes the LRU victim.
        assert_eq!(cache.get("old"), Some(1));
        cache.set("new", 3, None, Vec::new());

        assert_eq!(cache.get("old"), Some(1));
        assert_eq!(cache.get("fresh"), None);
    }

    #[test]
    fn test_ttl_expiry_counts_as_miss() {
        let mut cache: LruCache<u32> = LruCache::new(CacheLimits::default(), &["test"]);
        cache.set("short", 7, Some(Duration::from_millis(1)), Vec::new());
        assert_eq!(cache.len(), 1);

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_hit_rate() {
        let mut cache: LruCache<u32> = LruCache::new(CacheLimits::default(), &["test"]);
        cache.set("k", 1, None, Vec::new());
        cache.get("k");
        cache.get("absent");
        assert!((cache.stats().hit_rate() - 0.5).abs() < f32::EPSILON);
    }
}
