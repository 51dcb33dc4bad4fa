//! Activity retrieval, ranking, and scheduling core for a trip-itinerary
//! generator.
//!
//! The crate takes a free-text request plus structured trip constraints,
//! finds matching activities in an in-memory catalog, ranks them with a
//! weighted multi-signal score, caches repeated lookups, and packs the
//! selected activities into day-by-day timetables. Rendering, persistence,
//! authentication, and the generative rewrite of results into prose all live
//! upstream of this crate.

pub mod models;
pub mod services;

pub use models::activity::{Activity, TimeWindow};
pub use models::context::{BudgetTier, SearchContext, TimeOfDay, WeatherCondition};
pub use models::schedule::{Category, ScheduleOptions, ScheduledActivity};
pub use models::search::{IntelligentSearchResult, ScoreWeights, SignalScores};
pub use services::activity_search_service::SearchEngine;
pub use services::cache_service::{CacheLimits, CacheManager, LruCache};
pub use services::day_scheduling_service::DayScheduler;
pub use services::providers::{CongestionLevel, EmbeddingProvider, TrafficProvider};
