use crate::models::activity::Activity;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Coarse activity category used for scoring, boosts, and scheduling
/// preferences. Display names match the tag vocabulary of the catalog.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Nature,
    Cultural,
    Food,
    Adventure,
    Shopping,
    Nightlife,
    Relaxation,
    General,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Nature,
        Category::Cultural,
        Category::Food,
        Category::Adventure,
        Category::Shopping,
        Category::Nightlife,
        Category::Relaxation,
        Category::General,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Nature => "Nature & Scenery",
            Category::Cultural => "Culture & Arts",
            Category::Food => "Food & Drinks",
            Category::Adventure => "Adventure",
            Category::Shopping => "Shopping",
            Category::Nightlife => "Nightlife",
            Category::Relaxation => "Relaxation",
            Category::General => "General",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Nature => "nature",
            Category::Cultural => "cultural",
            Category::Food => "food",
            Category::Adventure => "adventure",
            Category::Shopping => "shopping",
            Category::Nightlife => "nightlife",
            Category::Relaxation => "relaxation",
            Category::General => "general",
        }
    }

    /// Keywords that signal this category in titles, descriptions, and tags.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Nature => &[
                "park", "nature", "garden", "trail", "falls", "mountain", "scenic", "view",
                "viewpoint", "lake", "forest", "outdoor",
            ],
            Category::Cultural => &[
                "museum", "gallery", "art", "culture", "cultural", "heritage", "history",
                "historical", "temple", "cathedral", "village",
            ],
            Category::Food => &[
                "food", "restaurant", "cafe", "dining", "eat", "cuisine", "culinary", "coffee",
                "dessert", "delicacies",
            ],
            Category::Adventure => &[
                "adventure", "hiking", "hike", "trek", "climbing", "biking", "zipline", "horseback",
                "riding", "camping",
            ],
            Category::Shopping => &[
                "shopping", "market", "mall", "souvenir", "bazaar", "stalls", "shops", "crafts",
            ],
            Category::Nightlife => &["night", "nightlife", "bar", "live", "music", "evening"],
            Category::Relaxation => &["spa", "relax", "relaxation", "massage", "wellness", "stroll"],
            Category::General => &[],
        }
    }

    /// Food-adjacent categories win scheduling tie-breaks so meals land
    /// before fillers of equal score.
    pub fn is_food(&self) -> bool {
        matches!(self, Category::Food)
    }

    /// Best-effort category for an activity, from tags first and the title
    /// as a fallback. Unmatched activities are `General`.
    pub fn from_activity(activity: &Activity) -> Category {
        let haystack = format!(
            "{} {}",
            activity.title.to_lowercase(),
            activity.tags.join(" ").to_lowercase()
        );

        let mut best = Category::General;
        let mut best_hits = 0usize;
        for category in Category::ALL {
            if activity
                .tags
                .iter()
                .any(|t| t.eq_ignore_ascii_case(category.display_name()))
            {
                return category;
            }

            let hits = category
                .keywords()
                .iter()
                .filter(|k| haystack.contains(*k))
                .count();
            if hits > best_hits {
                best_hits = hits;
                best = category;
            }
        }

        best
    }
}

/// Day-level scheduling constraints supplied by the caller.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScheduleOptions {
    /// "HH:MM" day start; unparsable values fall back to the default.
    pub start_time: String,
    /// "HH:MM" day end.
    pub end_time: String,
    pub break_minutes: u16,
    pub max_activities: usize,
    /// Preferred placement times per category ("09:00", "12:30", ...).
    pub preferred_start_times: HashMap<Category, Vec<String>>,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            start_time: "08:00".to_string(),
            end_time: "22:00".to_string(),
            break_minutes: 30,
            max_activities: 6,
            preferred_start_times: HashMap::new(),
        }
    }
}

/// An activity pinned to a concrete `[start_time, end_time)` slot.
/// Within a day no two placements overlap, and the slot length equals the
/// activity's estimated duration.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScheduledActivity {
    pub activity: Activity,
    pub category: Category,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub score: f32,
}
