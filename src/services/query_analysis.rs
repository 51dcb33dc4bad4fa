//! Query Analysis
//!
//! Classifies what a free-text request is asking for, extracts the entities
//! it mentions, and expands it for recall. Lexical heuristics only; there is
//! no language model anywhere in this pipeline.

use crate::models::schedule::Category;
use crate::services::text_processing::{expand_tokens, tokenize};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Exploration,
    Cultural,
    Culinary,
    Adventure,
    Shopping,
    Nightlife,
    Relaxation,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Exploration => "exploration",
            Intent::Cultural => "cultural",
            Intent::Culinary => "culinary",
            Intent::Adventure => "adventure",
            Intent::Shopping => "shopping",
            Intent::Nightlife => "nightlife",
            Intent::Relaxation => "relaxation",
        }
    }

    /// The catalog category this intent most directly maps to.
    pub fn category(&self) -> Category {
        match self {
            Intent::Exploration => Category::Nature,
            Intent::Cultural => Category::Cultural,
            Intent::Culinary => Category::Food,
            Intent::Adventure => Category::Adventure,
            Intent::Shopping => Category::Shopping,
            Intent::Nightlife => Category::Nightlife,
            Intent::Relaxation => Category::Relaxation,
        }
    }

    /// Extra recall terms folded into expanded queries for this intent.
    pub fn related_terms(&self) -> &'static [&'static str] {
        match self {
            Intent::Exploration => &["sightseeing", "landmark", "scenic"],
            Intent::Cultural => &["museum", "heritage", "history"],
            Intent::Culinary => &["restaurant", "local", "delicacies"],
            Intent::Adventure => &["outdoor", "trail", "trek"],
            Intent::Shopping => &["market", "souvenir", "stalls"],
            Intent::Nightlife => &["night", "live", "bar"],
            Intent::Relaxation => &["spa", "quiet", "stroll"],
        }
    }
}

/// One row of the intent classifier. The table is evaluated in order and
/// the first rule with the highest keyword overlap wins, so earlier rows
/// take precedence on ties.
pub struct IntentRule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
    pub weight: f32,
}

pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Exploration,
        keywords: &["explore", "see", "visit", "sightseeing", "tour", "view", "landmark"],
        weight: 0.9,
    },
    IntentRule {
        intent: Intent::Cultural,
        keywords: &["museum", "culture", "cultural", "art", "history", "heritage", "gallery"],
        weight: 1.0,
    },
    IntentRule {
        intent: Intent::Culinary,
        keywords: &["food", "eat", "restaurant", "cafe", "dining", "cuisine", "coffee", "taste"],
        weight: 1.0,
    },
    IntentRule {
        intent: Intent::Adventure,
        keywords: &["hike", "hiking", "trek", "adventure", "climb", "bike", "outdoor", "trail"],
        weight: 1.0,
    },
    IntentRule {
        intent: Intent::Shopping,
        keywords: &["shop", "shopping", "market", "souvenir", "mall", "buy"],
        weight: 1.0,
    },
    IntentRule {
        intent: Intent::Nightlife,
        keywords: &["night", "nightlife", "bar", "drinks", "party", "live"],
        weight: 0.9,
    },
    IntentRule {
        intent: Intent::Relaxation,
        keywords: &["relax", "spa", "massage", "quiet", "chill", "unwind"],
        weight: 0.9,
    },
];

/// Nouns that name a kind of activity; extracted as entities.
const ACTIVITY_NOUNS: &[&str] = &[
    "park", "museum", "cafe", "market", "trail", "falls", "temple", "garden", "gallery",
    "restaurant", "viewpoint", "mine", "lake", "church", "village", "farm",
];

/// Place names the catalog's city actually has; matched against the raw
/// query so multi-word names are caught.
const GAZETTEER: &[&str] = &[
    "burnham park",
    "session road",
    "mines view",
    "camp john hay",
    "botanical garden",
    "bencab museum",
    "wright park",
    "la trinidad",
    "night market",
    "tam-awan village",
    "baguio cathedral",
    "mirador hill",
    "diplomat hotel",
    "lions head",
];

const TIME_REFERENCES: &[&str] = &[
    "morning", "afternoon", "evening", "night", "sunrise", "sunset", "noon", "tonight", "today",
];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QueryIntent {
    pub primary: Intent,
    pub confidence: f32,
    pub activity_nouns: Vec<String>,
    pub locations: Vec<String>,
    pub time_references: Vec<String>,
}

#[derive(Default)]
pub struct QueryProcessor;

impl QueryProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Classify the query against the fixed rule table and pull out the
    /// entities it mentions. Unclassifiable queries fall back to
    /// `Exploration` with floor confidence.
    pub fn analyze_intent(&self, query: &str) -> QueryIntent {
        let lowered = query.to_lowercase();
        let tokens = tokenize(query);

        let mut primary = Intent::Exploration;
        let mut best_score = 0.0f32;
        for rule in INTENT_RULES {
            let overlap = rule
                .keywords
                .iter()
                .filter(|keyword| tokens.iter().any(|t| t == *keyword))
                .count();
            let score = (overlap as f32 / rule.keywords.len() as f32) * rule.weight;
            if score > best_score {
                best_score = score;
                primary = rule.intent;
            }
        }

        let confidence = if best_score > 0.0 {
            best_score.min(1.0)
        } else {
            0.1
        };

        let mut seen_nouns = std::collections::HashSet::new();
        let activity_nouns: Vec<String> = tokens
            .iter()
            .filter(|t| ACTIVITY_NOUNS.contains(&t.as_str()) && seen_nouns.insert((*t).clone()))
            .cloned()
            .collect();

        let locations: Vec<String> = GAZETTEER
            .iter()
            .filter(|place| lowered.contains(*place))
            .map(|place| place.to_string())
            .collect();

        let mut seen_times = std::collections::HashSet::new();
        let time_references: Vec<String> = tokens
            .iter()
            .filter(|t| TIME_REFERENCES.contains(&t.as_str()) && seen_times.insert((*t).clone()))
            .cloned()
            .collect();

        QueryIntent {
            primary,
            confidence,
            activity_nouns,
            locations,
            time_references,
        }
    }

    /// Union of raw tokens, table synonyms, and intent-specific related
    /// terms, de-duplicated in first-seen order.
    pub fn expand_query(&self, query: &str, intent: &QueryIntent) -> Vec<String> {
        let tokens = tokenize(query);
        let mut expanded = expand_tokens(&tokens);

        for term in intent.primary.related_terms() {
            if !expanded.iter().any(|t| t == term) {
                expanded.push(term.to_string());
            }
        }

        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_culinary_intent_wins_on_food_query() {
        let processor = QueryProcessor::new();
        let intent = processor.analyze_intent("best food and coffee in the city");
        assert_eq!(intent.primary, Intent::Culinary);
        assert!(intent.confidence > 0.1);
    }

    #[test]
    fn test_unclassifiable_query_falls_back_to_exploration() {
        let processor = QueryProcessor::new();
        let intent = processor.analyze_intent("zzz qqq");
        assert_eq!(intent.primary, Intent::Exploration);
        assert!((intent.confidence - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_entity_extraction() {
        let processor = QueryProcessor::new();
        let intent = processor.analyze_intent("visit Burnham Park in the morning for a park stroll");
        assert_eq!(intent.locations, vec!["burnham park"]);
        assert!(intent.activity_nouns.contains(&"park".to_string()));
        assert!(intent.time_references.contains(&"morning".to_string()));
    }

    #[test]
    fn test_expand_query_includes_intent_terms() {
        let processor = QueryProcessor::new();
        let intent = processor.analyze_intent("local food");
        let expanded = processor.expand_query("local food", &intent);
        assert!(expanded.contains(&"food".to_string()));
        assert!(expanded.contains(&"dining".to_string()));
        assert!(expanded.contains(&"delicacies".to_string()));
    }
}
