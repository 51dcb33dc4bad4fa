//! Search Optimization Service
//!
//! Turns a query plus trip context into a reusable optimization plan
//! (category boosts and filter recommendations) and re-ranks a result set
//! with it. The plan is a plain value, so a caller can compute it once and
//! apply it to several retrievals.

use crate::models::context::{SearchContext, TimeOfDay, WeatherCondition};
use crate::models::schedule::Category;
use crate::models::search::{IntelligentSearchResult, ScoreWeights};
use crate::services::query_analysis::{QueryIntent, QueryProcessor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const INTEREST_BOOST: f32 = 0.15;
const WEATHER_BOOST: f32 = 0.10;
const TIME_OF_DAY_BOOST: f32 = 0.05;
const INTENT_BOOST: f32 = 0.20;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Category,
    TimeSlot,
    Budget,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilterRecommendation {
    pub kind: FilterKind,
    pub value: String,
    pub reason: String,
}

/// A reusable boost/filter plan for one (query, context) pair.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchOptimization {
    pub intent: QueryIntent,
    pub category_boosts: HashMap<Category, f32>,
    pub filters: Vec<FilterRecommendation>,
}

pub struct SearchOptimizer {
    weights: ScoreWeights,
}

impl Default for SearchOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchOptimizer {
    pub fn new() -> Self {
        Self {
            weights: ScoreWeights::default(),
        }
    }

    pub fn with_weights(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Build the plan: positive category boosts wherever the intent,
    /// interests, weather, or time of day align, plus an ordered list of
    /// filter recommendations.
    pub fn generate_search_optimization(
        &self,
        query: &str,
        query_processor: &QueryProcessor,
        context: &SearchContext,
    ) -> SearchOptimization {
        let intent = query_processor.analyze_intent(query);
        let mut boosts: HashMap<Category, f32> = HashMap::new();

        *boosts.entry(intent.primary.category()).or_insert(0.0) +=
            INTENT_BOOST * intent.confidence;

        for interest in &context.interests {
            if let Some(category) = match_interest(interest) {
                *boosts.entry(category).or_insert(0.0) += INTEREST_BOOST;
            }
        }

        for category in weather_friendly_categories(context.weather) {
            *boosts.entry(*category).or_insert(0.0) += WEATHER_BOOST;
        }

        for category in time_of_day_categories(context.time_of_day) {
            *boosts.entry(*category).or_insert(0.0) += TIME_OF_DAY_BOOST;
        }

        let mut filters = Vec::new();
        if intent.confidence > 0.2 {
            filters.push(FilterRecommendation {
                kind: FilterKind::Category,
                value: intent.primary.category().as_str().to_string(),
                reason: format!("query reads as {}", intent.primary.as_str()),
            });
        }
        filters.push(FilterRecommendation {
            kind: FilterKind::TimeSlot,
            value: context.time_of_day.as_str().to_string(),
            reason: "match the request's time of day".to_string(),
        });
        filters.push(FilterRecommendation {
            kind: FilterKind::Budget,
            value: context.budget.as_str().to_string(),
            reason: "stay within the trip's budget tier".to_string(),
        });

        SearchOptimization {
            intent,
            category_boosts: boosts,
            filters,
        }
    }

    /// Fold the plan's boosts into each result's contextual signal,
    /// recompute composites, and re-sort. The sort is stable, so equal
    /// composites keep their original order.
    pub fn optimize_search_results(
        &self,
        results: &mut [IntelligentSearchResult],
        plan: &SearchOptimization,
        _context: &SearchContext,
    ) {
        for result in results.iter_mut() {
            let category = Category::from_activity(&result.activity);
            if let Some(boost) = plan.category_boosts.get(&category) {
                if *boost > 0.0 {
                    result.scores.contextual = (result.scores.contextual + boost).min(1.0);
                    result.scores.composite = self.weights.composite(&result.scores);
                    result.reasoning.push(format!(
                        "{} aligns with the trip context (+{:.2})",
                        category.display_name(),
                        boost
                    ));
                }
            }
        }

        results.sort_by(|a, b| {
            b.scores
                .composite
                .partial_cmp(&a.scores.composite)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

/// Map a free-form interest string onto a category by display name or
/// keyword overlap.
pub(crate) fn match_interest(interest: &str) -> Option<Category> {
    let lowered = interest.to_lowercase();
    for category in Category::ALL {
        if category.display_name().to_lowercase() == lowered
            || category.as_str() == lowered
            || category.keywords().iter().any(|k| lowered.contains(k))
        {
            if category != Category::General {
                return Some(category);
            }
        }
    }
    None
}

pub(crate) fn weather_friendly_categories(weather: WeatherCondition) -> &'static [Category] {
    match weather {
        WeatherCondition::Clear => &[Category::Nature, Category::Adventure],
        WeatherCondition::Cloudy => &[Category::Nature, Category::Cultural],
        WeatherCondition::Rainy => &[Category::Cultural, Category::Food, Category::Shopping],
        WeatherCondition::Cold => &[Category::Food, Category::Cultural],
        WeatherCondition::Hot => &[Category::Relaxation, Category::Food],
    }
}

fn time_of_day_categories(time_of_day: TimeOfDay) -> &'static [Category] {
    match time_of_day {
        TimeOfDay::Morning => &[Category::Nature, Category::Adventure],
        TimeOfDay::Afternoon => &[Category::Cultural, Category::Shopping],
        TimeOfDay::Evening => &[Category::Food, Category::Nightlife],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::{Activity, TimeWindow};
    use crate::models::search::{ResultMetadata, SignalScores};

    fn result_for(activity: Activity, contextual: f32) -> IntelligentSearchResult {
        let weights = ScoreWeights::default();
        let mut scores = SignalScores {
            contextual,
            ..Default::default()
        };
        scores.composite = weights.composite(&scores);
        IntelligentSearchResult {
            activity,
            scores,
            reasoning: Vec::new(),
            confidence: 0.5,
            metadata: ResultMetadata::default(),
        }
    }

    #[test]
    fn test_rainy_weather_boosts_indoor_categories() {
        let optimizer = SearchOptimizer::new();
        let processor = QueryProcessor::new();
        let context = SearchContext {
            weather: WeatherCondition::Rainy,
            ..Default::default()
        };

        let plan = optimizer.generate_search_optimization("things to do", &processor, &context);
        assert!(plan.category_boosts.get(&Category::Cultural).copied().unwrap_or(0.0) > 0.0);
        assert!(plan.category_boosts.get(&Category::Food).copied().unwrap_or(0.0) > 0.0);
    }

    #[test]
    fn test_boosted_result_moves_up() {
        let optimizer = SearchOptimizer::new();
        let processor = QueryProcessor::new();
        let context = SearchContext {
            interests: vec!["Food & Drinks".to_string()],
            ..Default::default()
        };
        let plan = optimizer.generate_search_optimization("anything", &processor, &context);

        let museum = Activity::new(
            "BenCab Museum",
            "Contemporary art",
            &["Culture & Arts"],
            TimeWindow::new("9:00 AM", "6:00 PM"),
        );
        let cafe = Activity::new(
            "Cafe by the Ruins",
            "Heritage dining",
            &["Food & Drinks"],
            TimeWindow::new("7:00 AM", "9:00 PM"),
        );

        let mut results = vec![result_for(museum, 0.30), result_for(cafe, 0.28)];
        optimizer.optimize_search_results(&mut results, &plan, &context);

        assert_eq!(results[0].activity.title, "Cafe by the Ruins");
        assert!(!results[0].reasoning.is_empty());
    }

    #[test]
    fn test_filter_recommendations_are_ordered() {
        let optimizer = SearchOptimizer::new();
        let processor = QueryProcessor::new();
        let context = SearchContext::default();

        let plan =
            optimizer.generate_search_optimization("museum and art galleries", &processor, &context);
        assert_eq!(plan.filters[0].kind, FilterKind::Category);
        assert_eq!(plan.filters[0].value, "cultural");
    }
}
