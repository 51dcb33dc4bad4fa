//! Day Scheduling Service
//!
//! Packs ranked activities into a day-by-day timetable. Placement is a
//! greedy sweep over the day's free intervals: higher-scored activities
//! claim slots first, breaks are carved out after every placement, and
//! anything that no longer fits is dropped rather than erroring.
//!
//! ## Features
//! - Vector-score blending (0.7 vector / 0.3 base) when scores are supplied
//! - Category-aware tie-breaks: meals first, then shorter activities
//! - Duration estimation from explicit hints or a category keyword table
//! - Preferred-start-time placement per category
//! - Short-lived result caches for repeated day and itinerary requests
//! - No activity is ever scheduled twice across a multi-day plan

use crate::models::activity::Activity;
use crate::models::context::TimeOfDay;
use crate::models::schedule::{Category, ScheduleOptions, ScheduledActivity};
use crate::services::cache_service::{CacheLimits, LruCache};
use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const DEFAULT_DAY_START_MINUTES: i32 = 8 * 60;
const DEFAULT_DAY_END_MINUTES: i32 = 22 * 60;
const DEFAULT_BASE_SCORE: f32 = 0.5;
const VECTOR_WEIGHT: f32 = 0.7;
const BASE_WEIGHT: f32 = 0.3;
// Staleness window for cached schedules.
const SCHEDULE_CACHE_TTL_SECS: u64 = 600;
const SCHEDULE_CACHE_BYTES: usize = 256 * 1024;
const SCHEDULE_CACHE_ENTRIES: usize = 64;

/// Duration fallbacks by keyword, first match wins.
const DURATION_TABLE: &[(&[&str], u16)] = &[
    (&["tour", "tours"], 180),
    (&["museum", "gallery", "exhibit"], 120),
    (
        &["park", "nature", "garden", "trail", "falls", "viewpoint", "hike"],
        120,
    ),
    (
        &["restaurant", "cafe", "food", "dining", "dinner", "lunch", "breakfast"],
        90,
    ),
    (&["market", "shopping", "mall", "bazaar"], 90),
];
const DEFAULT_DURATION_MINUTES: u16 = 60;

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleStats {
    pub scheduled: usize,
    pub dropped: usize,
    pub busy_minutes: u32,
    pub free_minutes: u32,
}

pub struct DayScheduler {
    day_cache: LruCache<Vec<ScheduledActivity>>,
    itinerary_cache: LruCache<Vec<Vec<ScheduledActivity>>>,
}

impl Default for DayScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DayScheduler {
    pub fn new() -> Self {
        let limits = CacheLimits {
            max_bytes: SCHEDULE_CACHE_BYTES,
            default_ttl: Duration::from_secs(SCHEDULE_CACHE_TTL_SECS),
            max_entries: SCHEDULE_CACHE_ENTRIES,
        };
        Self {
            day_cache: LruCache::new(limits.clone(), &["schedule", "day"]),
            itinerary_cache: LruCache::new(limits, &["schedule", "itinerary"]),
        }
    }

    /// Pack one day. Activities that fit nowhere are dropped silently; the
    /// output is ordered by start time and never overlaps.
    pub fn schedule_activities_for_day(
        &mut self,
        activities: &[Activity],
        options: &ScheduleOptions,
        vector_scores: Option<&HashMap<String, f32>>,
    ) -> Vec<ScheduledActivity> {
        let ranked = rank_for_packing(activities, vector_scores);
        let key = day_cache_key(&ranked, options);
        if let Some(cached) = self.day_cache.get(&key) {
            return cached;
        }

        let schedule = pack_day(&ranked, options);
        self.day_cache.set(&key, schedule.clone(), None, Vec::new());
        schedule
    }

    /// Schedule every day of a trip. A title placed on an earlier day is
    /// excluded from all later days.
    pub fn schedule_multi_day_itinerary(
        &mut self,
        activities_by_day: &[Vec<Activity>],
        options: &ScheduleOptions,
        vector_scores: Option<&HashMap<String, f32>>,
    ) -> Vec<Vec<ScheduledActivity>> {
        let key = itinerary_cache_key(activities_by_day, options, vector_scores);
        if let Some(cached) = self.itinerary_cache.get(&key) {
            if cached.len() == activities_by_day.len() {
                return cached;
            }
            // The cached plan no longer lines up with the request shape;
            // reschedule each day independently.
            log::warn!("cached itinerary shape mismatch, rescheduling per day");
            self.itinerary_cache.remove(&key);
        }

        let mut placed_titles: HashSet<String> = HashSet::new();
        let mut itinerary = Vec::with_capacity(activities_by_day.len());

        for day_activities in activities_by_day {
            let fresh: Vec<Activity> = day_activities
                .iter()
                .filter(|a| !placed_titles.contains(&a.title))
                .cloned()
                .collect();

            let day_schedule = self.schedule_activities_for_day(&fresh, options, vector_scores);
            for placement in &day_schedule {
                placed_titles.insert(placement.activity.title.clone());
            }
            itinerary.push(day_schedule);
        }

        self.itinerary_cache
            .set(&key, itinerary.clone(), None, Vec::new());
        itinerary
    }

    /// Bucket a day's placements by start hour: Morning before 12:00,
    /// Afternoon before 18:00, Evening from 18:00.
    pub fn group_activities_by_period(
        schedule: &[ScheduledActivity],
    ) -> HashMap<TimeOfDay, Vec<ScheduledActivity>> {
        let mut periods: HashMap<TimeOfDay, Vec<ScheduledActivity>> = HashMap::new();
        for placement in schedule {
            periods
                .entry(TimeOfDay::from_time(placement.start_time))
                .or_default()
                .push(placement.clone());
        }
        periods
    }

    /// Summary of how full the day ended up.
    pub fn schedule_stats(
        activities: &[Activity],
        schedule: &[ScheduledActivity],
        options: &ScheduleOptions,
    ) -> ScheduleStats {
        let busy_minutes: u32 = schedule
            .iter()
            .map(|p| minutes_between(p.start_time, p.end_time))
            .sum();
        let day_start = parse_clock(&options.start_time).unwrap_or(DEFAULT_DAY_START_MINUTES);
        let day_end = parse_clock(&options.end_time).unwrap_or(DEFAULT_DAY_END_MINUTES);
        let window = (day_end - day_start).max(0) as u32;

        ScheduleStats {
            scheduled: schedule.len(),
            dropped: activities.len().saturating_sub(schedule.len()),
            busy_minutes,
            free_minutes: window.saturating_sub(busy_minutes),
        }
    }
}

/// An activity with everything packing needs precomputed.
struct RankedActivity {
    activity: Activity,
    category: Category,
    score: f32,
    duration_minutes: i32,
}

/// Blend scores and order for packing: best combined score first, meals
/// ahead of equal-scored non-meals, shorter ahead of longer.
fn rank_for_packing(
    activities: &[Activity],
    vector_scores: Option<&HashMap<String, f32>>,
) -> Vec<RankedActivity> {
    let mut ranked: Vec<RankedActivity> = activities
        .iter()
        .map(|activity| {
            let category = Category::from_activity(activity);
            let score = match vector_scores.and_then(|scores| scores.get(&activity.title)) {
                Some(vector) => VECTOR_WEIGHT * vector + BASE_WEIGHT * DEFAULT_BASE_SCORE,
                None => DEFAULT_BASE_SCORE,
            };
            RankedActivity {
                duration_minutes: estimate_duration(activity) as i32,
                category,
                score,
                activity: activity.clone(),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.category.is_food().cmp(&a.category.is_food()))
            .then_with(|| a.duration_minutes.cmp(&b.duration_minutes))
    });
    ranked
}

/// Greedy interval packing over the day window.
fn pack_day(ranked: &[RankedActivity], options: &ScheduleOptions) -> Vec<ScheduledActivity> {
    let day_start = parse_clock(&options.start_time).unwrap_or(DEFAULT_DAY_START_MINUTES);
    let day_end = parse_clock(&options.end_time).unwrap_or(DEFAULT_DAY_END_MINUTES);
    if day_end <= day_start {
        return Vec::new();
    }

    let mut free: Vec<(i32, i32)> = vec![(day_start, day_end)];
    let mut placed_titles: HashSet<String> = HashSet::new();
    let mut schedule: Vec<ScheduledActivity> = Vec::new();

    for item in ranked {
        if schedule.len() >= options.max_activities {
            break;
        }
        if !placed_titles.insert(item.activity.title.clone()) {
            continue;
        }

        let preferred = preferred_minutes(options, item.category);
        let slot = choose_slot(&free, item.duration_minutes, &preferred);

        let (interval_index, start) = match slot {
            Some(slot) => slot,
            None => {
                log::debug!(
                    "no free interval fits '{}' ({} min), dropping it",
                    item.activity.title,
                    item.duration_minutes
                );
                continue;
            }
        };

        let end = start + item.duration_minutes;
        schedule.push(ScheduledActivity {
            activity: item.activity.clone(),
            category: item.category,
            start_time: minutes_to_time(start),
            end_time: minutes_to_time(end),
            score: item.score,
        });

        // Carve out the slot plus the trailing break, keeping leftovers.
        let (interval_start, interval_end) = free.remove(interval_index);
        let occupied_end = end + options.break_minutes as i32;
        let mut replacements = Vec::new();
        if start > interval_start {
            replacements.push((interval_start, start));
        }
        if occupied_end < interval_end {
            replacements.push((occupied_end, interval_end));
        }
        for (offset, replacement) in replacements.into_iter().enumerate() {
            free.insert(interval_index + offset, replacement);
        }
    }

    schedule.sort_by_key(|p| p.start_time);
    schedule
}

/// Pick the interval to place into. With preferred start times, every
/// long-enough interval is scored by closeness to the nearest preferred
/// minute and the best wins; otherwise the first fit is taken.
fn choose_slot(
    free: &[(i32, i32)],
    duration: i32,
    preferred: &[i32],
) -> Option<(usize, i32)> {
    if preferred.is_empty() {
        return free
            .iter()
            .position(|(start, end)| end - start >= duration)
            .map(|index| (index, free[index].0));
    }

    let mut best: Option<(usize, i32, i32)> = None;
    for (index, (start, end)) in free.iter().enumerate() {
        if end - start < duration {
            continue;
        }
        for target in preferred {
            let candidate = (*target).clamp(*start, *end - duration);
            let distance = (candidate - *target).abs();
            let better = match best {
                Some((_, _, best_distance)) => distance < best_distance,
                None => true,
            };
            if better {
                best = Some((index, candidate, distance));
            }
        }
    }
    best.map(|(index, start, _)| (index, start))
}

fn preferred_minutes(options: &ScheduleOptions, category: Category) -> Vec<i32> {
    options
        .preferred_start_times
        .get(&category)
        .map(|times| times.iter().filter_map(|t| parse_clock(t)).collect())
        .unwrap_or_default()
}

/// Explicit hint first, then the keyword table over title and tags.
fn estimate_duration(activity: &Activity) -> u16 {
    if let Some(minutes) = activity.duration_minutes {
        return minutes;
    }

    let haystack = format!(
        "{} {}",
        activity.title.to_lowercase(),
        activity.tags.join(" ").to_lowercase()
    );
    for (keywords, minutes) in DURATION_TABLE {
        if keywords.iter().any(|keyword| haystack.contains(keyword)) {
            return *minutes;
        }
    }
    DEFAULT_DURATION_MINUTES
}

/// "HH:MM" (or "HH:MM:SS") to minutes from midnight.
fn parse_clock(text: &str) -> Option<i32> {
    let time = NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()?;
    Some((time.hour() * 60 + time.minute()) as i32)
}

fn minutes_to_time(minutes: i32) -> NaiveTime {
    let clamped = minutes.clamp(0, 24 * 60 - 1);
    NaiveTime::from_hms_opt((clamped / 60) as u32, (clamped % 60) as u32, 0)
        .unwrap_or(NaiveTime::MIN)
}

fn minutes_between(start: NaiveTime, end: NaiveTime) -> u32 {
    (end - start).num_minutes().max(0) as u32
}

fn day_cache_key(ranked: &[RankedActivity], options: &ScheduleOptions) -> String {
    let mut key = String::from("day:");
    for item in ranked {
        key.push_str(&format!(
            "{}|{}|{:.4};",
            item.activity.title,
            item.category.as_str(),
            item.score
        ));
    }
    key.push_str(&options_key(options));
    key
}

fn itinerary_cache_key(
    activities_by_day: &[Vec<Activity>],
    options: &ScheduleOptions,
    vector_scores: Option<&HashMap<String, f32>>,
) -> String {
    let mut key = String::from("itinerary:");
    for day in activities_by_day {
        for activity in day {
            key.push_str(&activity.title);
            key.push(';');
        }
        key.push_str("||");
    }
    key.push_str(&options_key(options));
    key.push('#');
    key.push_str(&vector_scores_hash(vector_scores));
    key
}

/// Options serialized with sorted categories so equal option sets always
/// produce equal keys.
fn options_key(options: &ScheduleOptions) -> String {
    let mut preferred: Vec<String> = options
        .preferred_start_times
        .iter()
        .map(|(category, times)| format!("{}={}", category.as_str(), times.join(",")))
        .collect();
    preferred.sort();

    format!(
        "opts:{}-{}/b{}/m{}/{}",
        options.start_time,
        options.end_time,
        options.break_minutes,
        options.max_activities,
        preferred.join("&")
    )
}

/// Truncated FNV-1a over the sorted vector scores.
fn vector_scores_hash(vector_scores: Option<&HashMap<String, f32>>) -> String {
    let mut items: Vec<String> = vector_scores
        .map(|scores| {
            scores
                .iter()
                .map(|(title, score)| format!("{}:{:.3}", title, score))
                .collect()
        })
        .unwrap_or_default();
    items.sort();

    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in items.join(";").bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    format!("{:08x}", hash & 0xffff_ffff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::TimeWindow;

    #[test]
    fn test_estimate_duration_table() {
        let museum = Activity::new(
            "BenCab Museum",
            "",
            &[],
            TimeWindow::new("9:00 AM", "6:00 PM"),
        );
        assert_eq!(estimate_duration(&museum), 120);

        let cafe = Activity::new("Hillside Cafe", "", &[], TimeWindow::new("7:00 AM", "9:00 PM"));
        assert_eq!(estimate_duration(&cafe), 90);

        let tour = Activity::new("Mine Tour", "", &[], TimeWindow::new("8:00 AM", "5:00 PM"));
        assert_eq!(estimate_duration(&tour), 180);

        let hinted = Activity::new("Anything", "", &[], TimeWindow::new("8:00 AM", "5:00 PM"))
            .with_duration(45);
        assert_eq!(estimate_duration(&hinted), 45);

        let plain = Activity::new("Plaza", "", &[], TimeWindow::new("8:00 AM", "5:00 PM"));
        assert_eq!(estimate_duration(&plain), 60);
    }

    #[test]
    fn test_choose_slot_prefers_nearest_preferred_time() {
        // Free: early morning and early afternoon; preferred lunch at 12:00.
        let free = vec![(8 * 60, 10 * 60), (12 * 60, 15 * 60)];
        let slot = choose_slot(&free, 90, &[12 * 60]);
        assert_eq!(slot, Some((1, 12 * 60)));
    }

    #[test]
    fn test_choose_slot_first_fit_without_preferences() {
        let free = vec![(8 * 60, 9 * 60), (10 * 60, 13 * 60)];
        let slot = choose_slot(&free, 90, &[]);
        assert_eq!(slot, Some((1, 10 * 60)));
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("08:30"), Some(510));
        assert_eq!(parse_clock("22:00"), Some(1320));
        assert_eq!(parse_clock("8am"), None);
    }
}
