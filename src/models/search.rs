use crate::models::activity::Activity;
use serde::{Deserialize, Serialize};

/// The six relevance signals plus their weighted aggregate. Every field is
/// in `0.0..=1.0`; `composite` is the weighted sum under [`ScoreWeights`].
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SignalScores {
    /// Token-overlap ratio between the expanded query and the activity.
    pub semantic: f32,
    /// Embedding cosine similarity; 0.0 whenever no provider is available.
    pub vector: f32,
    /// Edit-distance-tolerant partial match on individual tokens.
    pub fuzzy: f32,
    /// Interest/weather/time-of-day alignment, plus context boosts.
    pub contextual: f32,
    /// Peak-hours alignment with the request's current time.
    pub temporal: f32,
    /// Penalty for categories already well represented above this result.
    pub diversity: f32,
    pub composite: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ResultMetadata {
    /// Query tokens that matched the activity's indexed tokens.
    pub matched_terms: Vec<String>,
    /// Names of the signals that contributed to the composite.
    pub factors: Vec<String>,
}

/// One ranked search hit: the activity, its score record, human-readable
/// reasoning, and a confidence estimate. Created fresh per call.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IntelligentSearchResult {
    pub activity: Activity,
    pub scores: SignalScores,
    pub reasoning: Vec<String>,
    pub confidence: f32,
    pub metadata: ResultMetadata,
}

/// Weights for combining the six signals into a composite score. The
/// defaults are a tuned starting point, overridable per deployment through
/// environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub semantic_weight: f32,
    pub vector_weight: f32,
    pub fuzzy_weight: f32,
    pub contextual_weight: f32,
    pub temporal_weight: f32,
    pub diversity_weight: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            semantic_weight: 0.25,
            vector_weight: 0.20,
            fuzzy_weight: 0.15,
            contextual_weight: 0.20,
            temporal_weight: 0.10,
            diversity_weight: 0.10,
        }
    }
}

impl ScoreWeights {
    /// Create weights from environment variables or use defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            semantic_weight: std::env::var("SEARCH_SEMANTIC_WEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.semantic_weight),
            vector_weight: std::env::var("SEARCH_VECTOR_WEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.vector_weight),
            fuzzy_weight: std::env::var("SEARCH_FUZZY_WEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.fuzzy_weight),
            contextual_weight: std::env::var("SEARCH_CONTEXTUAL_WEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.contextual_weight),
            temporal_weight: std::env::var("SEARCH_TEMPORAL_WEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.temporal_weight),
            diversity_weight: std::env::var("SEARCH_DIVERSITY_WEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.diversity_weight),
        }
    }

    /// Weighted aggregate of the individual signals.
    pub fn composite(&self, scores: &SignalScores) -> f32 {
        scores.semantic * self.semantic_weight
            + scores.vector * self.vector_weight
            + scores.fuzzy * self.fuzzy_weight
            + scores.contextual * self.contextual_weight
            + scores.temporal * self.temporal_weight
            + scores.diversity * self.diversity_weight
    }

    /// Weighted contribution of each signal, in declaration order, for
    /// reasoning output.
    pub fn contributions(&self, scores: &SignalScores) -> [(&'static str, f32); 6] {
        [
            ("semantic", scores.semantic * self.semantic_weight),
            ("vector", scores.vector * self.vector_weight),
            ("fuzzy", scores.fuzzy * self.fuzzy_weight),
            ("contextual", scores.contextual * self.contextual_weight),
            ("temporal", scores.temporal * self.temporal_weight),
            ("diversity", scores.diversity * self.diversity_weight),
        ]
    }
}
