//! Activity Search Service
//!
//! The orchestrator behind `search(query, context, catalog)`. Retrieves
//! candidates from the inverted index, scores each against six relevance
//! signals, aggregates them into a weighted composite, and applies the
//! context optimization plan before returning the ranked list.
//!
//! ## Features
//! - Six-signal scoring: semantic, vector, fuzzy, contextual, temporal,
//!   diversity
//! - Reasoning strings for the top contributing signals on every result
//! - Index fallback to the full catalog so empty retrievals still rank
//! - Optional embedding and traffic providers; absence degrades the
//!   affected signal instead of failing the call
//! - Embeddings memoized in an LRU layer across searches

use crate::models::activity::Activity;
use crate::models::context::{SearchContext, TimeOfDay};
use crate::models::schedule::Category;
use crate::models::search::{
    IntelligentSearchResult, ResultMetadata, ScoreWeights, SignalScores,
};
use crate::services::cache_service::{CacheLimits, LruCache};
use crate::services::index_service::{parse_display_hour, IndexManager, IndexedActivity, TimeSlot};
use crate::services::providers::{
    cosine_similarity, static_congestion, CongestionLevel, EmbeddingProvider, TrafficProvider,
};
use crate::services::query_analysis::QueryProcessor;
use crate::services::search_optimization_service::{
    match_interest, weather_friendly_categories, SearchOptimizer,
};
use crate::services::text_processing::{generate_ngrams, tokenize};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const EMBEDDING_MEMO_BYTES: usize = 1024 * 1024;
const EMBEDDING_MEMO_TTL_SECS: u64 = 3600;
const EMBEDDING_MEMO_ENTRIES: usize = 512;

/// Per-category diversity penalty step; the fourth result of a category
/// scores zero on the diversity signal.
const DIVERSITY_STEP: f32 = 0.25;

pub struct SearchEngine {
    index: IndexManager,
    query_processor: QueryProcessor,
    optimizer: SearchOptimizer,
    weights: ScoreWeights,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    traffic_provider: Option<Arc<dyn TrafficProvider>>,
    embedding_memo: LruCache<Vec<f32>>,
    catalog_fingerprint: Option<String>,
    hour_pattern: Option<Regex>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::with_weights(ScoreWeights::from_env())
    }

    pub fn with_weights(weights: ScoreWeights) -> Self {
        Self {
            index: IndexManager::new(),
            query_processor: QueryProcessor::new(),
            optimizer: SearchOptimizer::with_weights(weights.clone()),
            weights,
            embedding_provider: None,
            traffic_provider: None,
            embedding_memo: LruCache::new(
                CacheLimits {
                    max_bytes: EMBEDDING_MEMO_BYTES,
                    default_ttl: Duration::from_secs(EMBEDDING_MEMO_TTL_SECS),
                    max_entries: EMBEDDING_MEMO_ENTRIES,
                },
                &["embeddings"],
            ),
            catalog_fingerprint: None,
            hour_pattern: Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*(am|pm)?").ok(),
        }
    }

    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    pub fn with_traffic_provider(mut self, provider: Arc<dyn TrafficProvider>) -> Self {
        self.traffic_provider = Some(provider);
        self
    }

    pub fn index(&self) -> &IndexManager {
        &self.index
    }

    /// Search the catalog. Empty catalogs and empty queries both degrade to
    /// a (possibly empty) ranked list; this method never fails.
    pub async fn search(
        &mut self,
        query: &str,
        context: &SearchContext,
        activities: &[Activity],
    ) -> Vec<IntelligentSearchResult> {
        if activities.is_empty() {
            return Vec::new();
        }

        self.ensure_index(activities);

        let intent = self.query_processor.analyze_intent(query);
        let expanded = self.query_processor.expand_query(query, &intent);
        let plan =
            self.optimizer
                .generate_search_optimization(query, &self.query_processor, context);

        let mut candidates = self.index.search_by_tokens(&expanded.join(" "));
        if candidates.is_empty() {
            // Nothing retrievable (often an empty or malformed query):
            // rank the whole catalog on context and time-slot fit instead.
            log::debug!("no index hits for '{}', falling back to full catalog", query);
            candidates = (0..self.index.len()).map(|i| (i, 0.0)).collect();
        }

        let query_tokens = tokenize(query);
        let query_bigrams = generate_ngrams(&query_tokens, 2);
        let query_embedding = self.embed_query(query).await;

        let mut category_counts: HashMap<Category, usize> = HashMap::new();
        let mut results = Vec::with_capacity(candidates.len());

        for (position, _) in candidates {
            let entry = match self.index.entry(position) {
                Some(entry) => entry.clone(),
                None => continue,
            };
            let category = Category::from_activity(&entry.activity);
            let seen_in_category = *category_counts.get(&category).unwrap_or(&0);

            let mut reasoning = Vec::new();

            let semantic = semantic_score(&query_tokens, &query_bigrams, &entry);
            let vector = match &query_embedding {
                Some(embedding) => self.vector_score(embedding, &entry.activity).await,
                None => {
                    reasoning.push("vector signal unavailable, scored without it".to_string());
                    0.0
                }
            };
            let fuzzy = fuzzy_score(&query_tokens, &entry);
            let contextual = self.contextual_score(&entry, context);
            let temporal = self.temporal_score(&entry, context).await;
            let diversity = (1.0 - DIVERSITY_STEP * seen_in_category as f32).max(0.0);

            let mut scores = SignalScores {
                semantic,
                vector,
                fuzzy,
                contextual,
                temporal,
                diversity,
                composite: 0.0,
            };
            scores.composite = self.weights.composite(&scores);

            let mut contributions = self.weights.contributions(&scores);
            contributions.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            for (name, contribution) in contributions.iter().take(2) {
                if *contribution > 0.0 {
                    reasoning.push(format!(
                        "{} signal carried {:.2} of the composite",
                        name, contribution
                    ));
                }
            }

            let matched_terms: Vec<String> = query_tokens
                .iter()
                .filter(|t| entry.tokens.contains(*t))
                .cloned()
                .collect();
            let factors = nonzero_factors(&scores);
            let coverage = factors.len() as f32 / 6.0;
            let confidence = (scores.composite * 0.8 + coverage * 0.2).clamp(0.0, 1.0);

            category_counts
                .entry(category)
                .and_modify(|c| *c += 1)
                .or_insert(1);

            results.push(IntelligentSearchResult {
                activity: entry.activity,
                scores,
                reasoning,
                confidence,
                metadata: ResultMetadata {
                    matched_terms,
                    factors,
                },
            });
        }

        results.sort_by(|a, b| {
            b.scores
                .composite
                .partial_cmp(&a.scores.composite)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        self.optimizer
            .optimize_search_results(&mut results, &plan, context);

        results
    }

    /// Rebuild the index when the catalog handed in differs from the one
    /// indexed last, fingerprinted by length and boundary titles.
    fn ensure_index(&mut self, activities: &[Activity]) {
        let fingerprint = format!(
            "{}:{}:{}",
            activities.len(),
            activities.first().map(|a| a.title.as_str()).unwrap_or(""),
            activities.last().map(|a| a.title.as_str()).unwrap_or(""),
        );
        if self.catalog_fingerprint.as_deref() != Some(&fingerprint) || !self.index.is_built() {
            self.index.build_index(activities);
            self.catalog_fingerprint = Some(fingerprint);
        }
    }

    async fn embed_query(&mut self, query: &str) -> Option<Vec<f32>> {
        let provider = self.embedding_provider.clone()?;
        if query.trim().is_empty() {
            return None;
        }
        if let Some(cached) = self.embedding_memo.get(query) {
            return Some(cached);
        }
        match provider.embed(query).await {
            Ok(embedding) => {
                self.embedding_memo.set(query, embedding.clone(), None, Vec::new());
                Some(embedding)
            }
            Err(e) => {
                log::warn!("query embedding failed, vector signal degrades to 0: {}", e);
                None
            }
        }
    }

    async fn vector_score(&mut self, query_embedding: &[f32], activity: &Activity) -> f32 {
        let provider = match &self.embedding_provider {
            Some(provider) => provider.clone(),
            None => return 0.0,
        };
        let text = format!("{}. {}", activity.title, activity.description);
        if let Some(cached) = self.embedding_memo.get(&text) {
            return cosine_similarity(query_embedding, &cached);
        }
        match provider.embed(&text).await {
            Ok(embedding) => {
                let similarity = cosine_similarity(query_embedding, &embedding);
                self.embedding_memo.set(&text, embedding, None, Vec::new());
                similarity
            }
            Err(e) => {
                log::warn!("activity embedding failed for '{}': {}", activity.title, e);
                0.0
            }
        }
    }

    /// Interest, weather, and time-of-day alignment, weighted 50/25/25.
    fn contextual_score(&self, entry: &IndexedActivity, context: &SearchContext) -> f32 {
        let interest_score = if context.interests.is_empty() {
            0.5
        } else {
            context
                .interests
                .iter()
                .filter_map(|interest| match_interest(interest))
                .map(|category| {
                    entry
                        .category_scores
                        .get(&category)
                        .copied()
                        .unwrap_or(0.0)
                })
                .fold(0.0f32, f32::max)
        };

        let weather_score = weather_friendly_categories(context.weather)
            .iter()
            .map(|category| entry.category_scores.get(category).copied().unwrap_or(0.0))
            .fold(0.0f32, f32::max);

        let time_score = match (entry.time_slot, context.time_of_day) {
            (TimeSlot::Flexible, _) => 0.7,
            (TimeSlot::Morning, TimeOfDay::Morning)
            | (TimeSlot::Afternoon, TimeOfDay::Afternoon)
            | (TimeSlot::Evening, TimeOfDay::Evening) => 1.0,
            _ => 0.3,
        };

        (interest_score * 0.5 + weather_score * 0.25 + time_score * 0.25).clamp(0.0, 1.0)
    }

    /// Peak-hours alignment with the request time. Prefers the traffic
    /// provider, then the declared peak-hours window, then the static
    /// time-of-day table. Visiting outside the crowded window scores
    /// higher.
    async fn temporal_score(&self, entry: &IndexedActivity, context: &SearchContext) -> f32 {
        if let (Some(provider), Some(coordinates)) =
            (&self.traffic_provider, entry.activity.coordinates)
        {
            match provider.congestion(coordinates, context.current_time).await {
                Ok(level) => return congestion_score(level),
                Err(e) => {
                    log::warn!(
                        "traffic lookup failed for '{}', using declared peak hours: {}",
                        entry.activity.title,
                        e
                    );
                }
            }
        }

        if let Some(peak) = &entry.activity.peak_hours {
            if let Some((start, end)) = self.peak_window(peak) {
                let hour = chrono::Timelike::hour(&context.current_time);
                let in_peak = if start <= end {
                    (start..=end).contains(&hour)
                } else {
                    // Window wraps past midnight.
                    hour >= start || hour <= end
                };
                return if in_peak { 0.3 } else { 0.9 };
            }
        }

        congestion_score(static_congestion(context.current_time))
    }

    /// Parse a declared peak-hours string like "10:00-14:00" or
    /// "10 AM - 2 PM" into start/end hours.
    fn peak_window(&self, peak_hours: &str) -> Option<(u32, u32)> {
        let pattern = self.hour_pattern.as_ref()?;
        let (start_text, end_text) = peak_hours.split_once('-')?;
        let start = parse_display_hour(start_text.trim(), pattern)?;
        let end = parse_display_hour(end_text.trim(), pattern)?;
        Some((start, end))
    }
}

fn congestion_score(level: CongestionLevel) -> f32 {
    match level {
        CongestionLevel::Low => 0.9,
        CongestionLevel::Moderate => 0.6,
        CongestionLevel::Heavy => 0.3,
    }
}

/// Token-overlap ratio with a small bigram bonus.
fn semantic_score(
    query_tokens: &[String],
    query_bigrams: &[String],
    entry: &IndexedActivity,
) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let matched = query_tokens
        .iter()
        .filter(|t| entry.tokens.contains(*t))
        .count();
    let mut score = matched as f32 / query_tokens.len() as f32;
    if query_bigrams.iter().any(|b| entry.ngrams.contains(b)) {
        score += 0.15;
    }
    score.min(1.0)
}

/// Best normalized edit-distance similarity per query token, averaged.
/// Containment counts as a strong partial match.
fn fuzzy_score(query_tokens: &[String], entry: &IndexedActivity) -> f32 {
    if query_tokens.is_empty() || entry.tokens.is_empty() {
        return 0.0;
    }

    let total: f32 = query_tokens
        .iter()
        .map(|query_token| {
            entry
                .tokens
                .iter()
                .map(|token| {
                    if token == query_token {
                        1.0
                    } else if token.contains(query_token.as_str())
                        || query_token.contains(token.as_str())
                    {
                        0.75f32.max(levenshtein_similarity(query_token, token))
                    } else {
                        levenshtein_similarity(query_token, token)
                    }
                })
                .fold(0.0f32, f32::max)
        })
        .sum();

    total / query_tokens.len() as f32
}

/// 1.0 minus the normalized Levenshtein distance.
fn levenshtein_similarity(a: &str, b: &str) -> f32 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f32 / longest as f32
}

fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

fn nonzero_factors(scores: &SignalScores) -> Vec<String> {
    let named = [
        ("semantic", scores.semantic),
        ("vector", scores.vector),
        ("fuzzy", scores.fuzzy),
        ("contextual", scores.contextual),
        ("temporal", scores.temporal),
        ("diversity", scores.diversity),
    ];
    named
        .iter()
        .filter(|(_, value)| *value > 0.0)
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("park", "park"), 0);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }

    #[test]
    fn test_levenshtein_similarity_tolerates_typos() {
        assert!(levenshtein_similarity("musuem", "museum") > 0.6);
        assert!(levenshtein_similarity("park", "spa") < 0.5);
    }
}
