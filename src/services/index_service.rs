//! Activity Index Service
//!
//! Builds an inverted index over the in-memory catalog and answers token
//! searches and category/time-slot filters against it.
//!
//! ## Features
//! - Token and bigram indexing of titles and descriptions
//! - Per-activity category scores from tag/keyword overlap
//! - Time-slot inference from the display window
//! - Rare tokens weighted higher during search
//! - Wholesale, idempotent rebuilds (readers never see a partial index)

use crate::models::activity::Activity;
use crate::models::schedule::Category;
use crate::services::text_processing::{expand_tokens, generate_ngrams, tokenize};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Coarse label for when an activity is open or best visited.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Flexible,
}

impl TimeSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::Evening => "evening",
            TimeSlot::Flexible => "flexible",
        }
    }
}

/// Catalog entry enriched with everything the scorer needs. Replaced
/// wholesale on rebuild, never mutated piecemeal.
#[derive(Debug, Clone)]
pub struct IndexedActivity {
    pub activity: Activity,
    pub tokens: HashSet<String>,
    pub ngrams: HashSet<String>,
    pub category_scores: HashMap<Category, f32>,
    pub time_slot: TimeSlot,
}

pub struct IndexManager {
    entries: Vec<IndexedActivity>,
    postings: HashMap<String, Vec<usize>>,
    built: bool,
}

impl Default for IndexManager {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexManager {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            postings: HashMap::new(),
            built: false,
        }
    }

    /// Index the catalog. The previous index stays live until the new one is
    /// fully assembled, then both structures are swapped together.
    pub fn build_index(&mut self, activities: &[Activity]) {
        let hour_pattern = Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*(am|pm)?").ok();

        let mut entries = Vec::with_capacity(activities.len());
        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();

        for (position, activity) in activities.iter().enumerate() {
            let text = format!("{} {}", activity.title, activity.description);
            let raw_tokens = tokenize(&text);
            let expanded = expand_tokens(&raw_tokens);
            let ngrams: HashSet<String> = generate_ngrams(&raw_tokens, 2).into_iter().collect();
            let tokens: HashSet<String> = expanded.iter().cloned().collect();

            for token in &tokens {
                postings.entry(token.clone()).or_default().push(position);
            }

            entries.push(IndexedActivity {
                category_scores: score_categories(activity),
                time_slot: infer_time_slot(activity, hour_pattern.as_ref()),
                activity: activity.clone(),
                tokens,
                ngrams,
            });
        }

        log::debug!(
            "index built: {} activities, {} distinct tokens",
            entries.len(),
            postings.len()
        );

        self.entries = entries;
        self.postings = postings;
        self.built = true;
    }

    /// Token search over the index. Per-activity weight accumulates one
    /// inverse-document-frequency term per matching token, so rare tokens
    /// dominate. Results come back ordered by descending weight with ties
    /// broken by catalog order. Unbuilt index yields nothing.
    pub fn search_by_tokens(&self, query: &str) -> Vec<(usize, f32)> {
        if !self.built || self.entries.is_empty() {
            return Vec::new();
        }

        let total = self.entries.len() as f32;
        let mut weights: HashMap<usize, f32> = HashMap::new();

        for token in tokenize(query) {
            if let Some(positions) = self.postings.get(&token) {
                let idf = (total / positions.len() as f32).ln() + 1.0;
                for &position in positions {
                    *weights.entry(position).or_insert(0.0) += idf;
                }
            }
        }

        let mut hits: Vec<(usize, f32)> = weights.into_iter().collect();
        hits.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        hits
    }

    /// Activities whose score for `category` is at least `min_score`.
    pub fn filter_by_category(&self, category: Category, min_score: f32) -> Vec<&IndexedActivity> {
        self.entries
            .iter()
            .filter(|entry| {
                entry
                    .category_scores
                    .get(&category)
                    .map(|score| *score >= min_score)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Activities whose inferred time slot matches. `Flexible` entries match
    /// every slot.
    pub fn filter_by_time_slot(&self, slot: TimeSlot) -> Vec<&IndexedActivity> {
        self.entries
            .iter()
            .filter(|entry| entry.time_slot == slot || entry.time_slot == TimeSlot::Flexible)
            .collect()
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexedActivity] {
        &self.entries
    }

    pub fn entry(&self, position: usize) -> Option<&IndexedActivity> {
        self.entries.get(position)
    }
}

/// Score each category by keyword overlap against the activity's tokens and
/// tags. An exact tag match pins the score to 1.0; otherwise three keyword
/// hits saturate the score.
fn score_categories(activity: &Activity) -> HashMap<Category, f32> {
    let haystack = format!(
        "{} {} {}",
        activity.title,
        activity.description,
        activity.tags.join(" ")
    )
    .to_lowercase();

    let mut scores = HashMap::new();
    for category in Category::ALL {
        let tagged = activity
            .tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(category.display_name()));
        let score = if tagged {
            1.0
        } else {
            let hits = category
                .keywords()
                .iter()
                .filter(|keyword| haystack.contains(*keyword))
                .count();
            (hits as f32 / 3.0).min(1.0)
        };
        if score > 0.0 {
            scores.insert(category, score);
        }
    }
    scores
}

/// Infer a time slot from the display window. Windows that span most of the
/// day, or that fail to parse, come out `Flexible`.
fn infer_time_slot(activity: &Activity, hour_pattern: Option<&Regex>) -> TimeSlot {
    let pattern = match hour_pattern {
        Some(p) => p,
        None => return TimeSlot::Flexible,
    };

    let start = parse_display_hour(&activity.time_window.start, pattern);
    let end = parse_display_hour(&activity.time_window.end, pattern);

    match (start, end) {
        (Some(start), Some(end)) => {
            if end <= 13 && end > start {
                TimeSlot::Morning
            } else if start >= 16 {
                TimeSlot::Evening
            } else if start >= 11 && end <= 19 {
                TimeSlot::Afternoon
            } else {
                TimeSlot::Flexible
            }
        }
        _ => TimeSlot::Flexible,
    }
}

/// Extract a 24-hour value from a display string like "6:00 AM" or "18:30".
pub(crate) fn parse_display_hour(text: &str, pattern: &Regex) -> Option<u32> {
    let captures = pattern.captures(text)?;
    let mut hour: u32 = captures.get(1)?.as_str().parse().ok()?;
    if hour > 23 {
        return None;
    }
    if let Some(meridiem) = captures.get(3) {
        let meridiem = meridiem.as_str().to_lowercase();
        if meridiem == "pm" && hour < 12 {
            hour += 12;
        } else if meridiem == "am" && hour == 12 {
            hour = 0;
        }
    }
    Some(hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::TimeWindow;

    fn catalog() -> Vec<Activity> {
        vec![
            Activity::new(
                "Burnham Park",
                "Rowboats, bike rentals, and gardens in the city center",
                &["Nature & Scenery"],
                TimeWindow::new("6:00 AM", "10:00 PM"),
            ),
            Activity::new(
                "BenCab Museum",
                "Contemporary art and Cordillera artifacts",
                &["Culture & Arts"],
                TimeWindow::new("9:00 AM", "6:00 PM"),
            ),
            Activity::new(
                "Night Market",
                "Street food and thrift stalls along Harrison Road",
                &["Shopping"],
                TimeWindow::new("9:00 PM", "2:00 AM"),
            ),
        ]
    }

    #[test]
    fn test_title_tokens_round_trip() {
        let activities = catalog();
        let mut index = IndexManager::new();
        index.build_index(&activities);

        for (position, activity) in activities.iter().enumerate() {
            for token in tokenize(&activity.title) {
                let hits = index.search_by_tokens(&token);
                assert!(
                    hits.iter().any(|(hit, _)| *hit == position),
                    "activity '{}' not found via its own title token '{}'",
                    activity.title,
                    token
                );
            }
        }
    }

    #[test]
    fn test_unbuilt_index_is_empty() {
        let index = IndexManager::new();
        assert!(index.search_by_tokens("park").is_empty());
        assert!(index.filter_by_category(Category::Nature, 0.1).is_empty());
        assert!(index.filter_by_time_slot(TimeSlot::Morning).is_empty());
    }

    #[test]
    fn test_rebuild_replaces_index() {
        let activities = catalog();
        let mut index = IndexManager::new();
        index.build_index(&activities);
        assert_eq!(index.len(), 3);

        index.build_index(&activities[..1]);
        assert_eq!(index.len(), 1);
        assert!(index.search_by_tokens("museum").is_empty());
    }

    #[test]
    fn test_category_filter_uses_tag_match() {
        let activities = catalog();
        let mut index = IndexManager::new();
        index.build_index(&activities);

        let nature = index.filter_by_category(Category::Nature, 0.9);
        assert_eq!(nature.len(), 1);
        assert_eq!(nature[0].activity.title, "Burnham Park");
    }

    #[test]
    fn test_time_slot_inference() {
        let activities = catalog();
        let mut index = IndexManager::new();
        index.build_index(&activities);

        assert_eq!(index.entries()[0].time_slot, TimeSlot::Flexible);
        assert_eq!(index.entries()[2].time_slot, TimeSlot::Evening);
    }

    #[test]
    fn test_rarer_tokens_rank_higher() {
        let mut activities = catalog();
        // "market" appears once, "park" twice after this push.
        activities.push(Activity::new(
            "Wright Park",
            "Pine-lined pond and horseback riding",
            &["Nature & Scenery"],
            TimeWindow::new("6:00 AM", "8:00 PM"),
        ));
        let mut index = IndexManager::new();
        index.build_index(&activities);

        let hits = index.search_by_tokens("market park");
        // Night Market matches the rarer token, so it should lead despite
        // matching only one term.
        assert_eq!(hits[0].0, 2);
    }
}
