mod common;

use chrono::NaiveTime;
use itinerary_engine::models::activity::{Activity, TimeWindow};
use itinerary_engine::models::context::TimeOfDay;
use itinerary_engine::models::schedule::{Category, ScheduleOptions};
use itinerary_engine::DayScheduler;
use std::collections::HashMap;

use common::{baguio_catalog, init_test_logging};

fn window(start: &str, end: &str) -> ScheduleOptions {
    ScheduleOptions {
        start_time: start.to_string(),
        end_time: end.to_string(),
        ..ScheduleOptions::default()
    }
}

fn timed_activity(title: &str, minutes: u16) -> Activity {
    Activity::new(title, "", &[], TimeWindow::new("8:00 AM", "10:00 PM")).with_duration(minutes)
}

#[test]
fn test_packed_day_never_overlaps() {
    init_test_logging();
    let mut scheduler = DayScheduler::new();
    let schedule =
        scheduler.schedule_activities_for_day(&baguio_catalog(), &ScheduleOptions::default(), None);

    assert!(!schedule.is_empty());
    for (i, a) in schedule.iter().enumerate() {
        assert!(a.start_time < a.end_time);
        for b in schedule.iter().skip(i + 1) {
            let overlaps = a.start_time < b.end_time && b.start_time < a.end_time;
            assert!(
                !overlaps,
                "'{}' and '{}' overlap",
                a.activity.title, b.activity.title
            );
        }
    }
}

#[test]
fn test_interval_length_matches_duration_hint() {
    let mut scheduler = DayScheduler::new();
    let activities = vec![timed_activity("Fixed Slot", 75)];
    let schedule =
        scheduler.schedule_activities_for_day(&activities, &ScheduleOptions::default(), None);

    assert_eq!(schedule.len(), 1);
    let placed = &schedule[0];
    assert_eq!(
        (placed.end_time - placed.start_time).num_minutes(),
        75,
        "slot length must equal the estimated duration"
    );
}

#[test]
fn test_infeasible_window_yields_empty_schedule() {
    let mut scheduler = DayScheduler::new();
    let activities = vec![timed_activity("Too Long", 90)];
    let schedule = scheduler.schedule_activities_for_day(&activities, &window("08:00", "09:00"), None);
    assert!(schedule.is_empty());
}

#[test]
fn test_break_is_enforced_between_placements() {
    let mut scheduler = DayScheduler::new();
    let activities = vec![timed_activity("First", 60), timed_activity("Second", 60)];
    let mut options = window("08:00", "12:00");
    options.break_minutes = 30;

    let schedule = scheduler.schedule_activities_for_day(&activities, &options, None);
    assert_eq!(schedule.len(), 2);
    let gap = (schedule[1].start_time - schedule[0].start_time).num_minutes();
    assert!(gap >= 90, "expected at least 90 minutes between starts, got {}", gap);
}

#[test]
fn test_max_activities_cap() {
    let mut scheduler = DayScheduler::new();
    let activities: Vec<Activity> = (0..10)
        .map(|i| timed_activity(&format!("Stop {}", i), 30))
        .collect();
    let mut options = ScheduleOptions::default();
    options.max_activities = 3;

    let schedule = scheduler.schedule_activities_for_day(&activities, &options, None);
    assert_eq!(schedule.len(), 3);
}

#[test]
fn test_vector_scores_pick_the_winner_for_scarce_slots() {
    let mut scheduler = DayScheduler::new();
    let activities = vec![timed_activity("Also Ran", 60), timed_activity("Favorite", 60)];
    let mut options = window("08:00", "09:30");
    options.max_activities = 1;

    let mut vector_scores = HashMap::new();
    vector_scores.insert("Favorite".to_string(), 0.95f32);

    let schedule =
        scheduler.schedule_activities_for_day(&activities, &options, Some(&vector_scores));
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0].activity.title, "Favorite");
}

#[test]
fn test_preferred_start_time_is_honored() {
    let mut scheduler = DayScheduler::new();
    let lunch = Activity::new(
        "Cafe by the Ruins",
        "Heritage dining",
        &["Food & Drinks"],
        TimeWindow::new("7:00 AM", "9:00 PM"),
    )
    .with_duration(90);

    let mut options = ScheduleOptions::default();
    options
        .preferred_start_times
        .insert(Category::Food, vec!["12:00".to_string()]);

    let schedule = scheduler.schedule_activities_for_day(&[lunch], &options, None);
    assert_eq!(schedule.len(), 1);
    assert_eq!(
        schedule[0].start_time,
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    );
}

#[test]
fn test_multi_day_never_repeats_an_activity() {
    let mut scheduler = DayScheduler::new();
    let catalog = baguio_catalog();
    // Same pool offered on every day.
    let days = vec![catalog.clone(), catalog.clone(), catalog];

    let itinerary =
        scheduler.schedule_multi_day_itinerary(&days, &ScheduleOptions::default(), None);

    assert_eq!(itinerary.len(), 3);
    let mut seen = std::collections::HashSet::new();
    for day in &itinerary {
        for placement in day {
            assert!(
                seen.insert(placement.activity.title.clone()),
                "'{}' was scheduled twice",
                placement.activity.title
            );
        }
    }
}

#[test]
fn test_repeated_request_is_served_from_cache() {
    let mut scheduler = DayScheduler::new();
    let catalog = baguio_catalog();
    let options = ScheduleOptions::default();

    let first = scheduler.schedule_activities_for_day(&catalog, &options, None);
    let second = scheduler.schedule_activities_for_day(&catalog, &options, None);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.activity.title, b.activity.title);
        assert_eq!(a.start_time, b.start_time);
    }
}

#[test]
fn test_group_by_period_buckets_on_start_hour() {
    let mut scheduler = DayScheduler::new();
    let activities = vec![
        timed_activity("Early", 60),
        timed_activity("Late Lunch", 60),
        timed_activity("Dusk", 60),
    ];
    // One activity per period: 08:00, 13:00, 19:00.
    let mut options = window("08:00", "22:00");
    options.break_minutes = 0;
    options
        .preferred_start_times
        .insert(Category::General, vec!["08:00".into(), "13:00".into(), "19:00".into()]);

    let schedule = scheduler.schedule_activities_for_day(&activities, &options, None);
    let periods = DayScheduler::group_activities_by_period(&schedule);

    let total: usize = periods.values().map(|v| v.len()).sum();
    assert_eq!(total, schedule.len());
    for placement in periods.get(&TimeOfDay::Morning).into_iter().flatten() {
        assert!(placement.start_time < NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }
    for placement in periods.get(&TimeOfDay::Evening).into_iter().flatten() {
        assert!(placement.start_time >= NaiveTime::from_hms_opt(18, 0, 0).unwrap());
    }
}

#[test]
fn test_schedule_stats_accounting() {
    let mut scheduler = DayScheduler::new();
    let activities = vec![timed_activity("Fits", 60), timed_activity("Does Not", 600)];
    let options = window("08:00", "10:00");

    let schedule = scheduler.schedule_activities_for_day(&activities, &options, None);
    let stats = DayScheduler::schedule_stats(&activities, &schedule, &options);

    assert_eq!(stats.scheduled, 1);
    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.busy_minutes, 60);
    assert_eq!(stats.free_minutes, 60);
}
