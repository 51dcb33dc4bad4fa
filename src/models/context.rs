use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rainy,
    Cold,
    Hot,
}

impl WeatherCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "clear",
            WeatherCondition::Cloudy => "cloudy",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::Cold => "cold",
            WeatherCondition::Hot => "hot",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// Bucket a clock time: Morning before 12:00, Afternoon before 18:00,
    /// Evening from 18:00 on.
    pub fn from_time(time: NaiveTime) -> Self {
        match time.hour() {
            0..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Low,
    Medium,
    High,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Low => "low",
            BudgetTier::Medium => "medium",
            BudgetTier::High => "high",
        }
    }
}

/// Per-request trip constraints. Built once by the caller and treated as
/// immutable for the duration of a search or scheduling call.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchContext {
    pub interests: Vec<String>,
    pub weather: WeatherCondition,
    pub time_of_day: TimeOfDay,
    pub budget: BudgetTier,
    pub group_size: u32,
    pub trip_duration_days: u32,
    pub current_time: NaiveTime,
    /// Free-form preference overrides ("pace" => "relaxed", etc.).
    pub preferences: HashMap<String, String>,
}

impl Default for SearchContext {
    fn default() -> Self {
        Self {
            interests: Vec::new(),
            weather: WeatherCondition::Clear,
            time_of_day: TimeOfDay::Morning,
            budget: BudgetTier::Medium,
            group_size: 2,
            trip_duration_days: 3,
            current_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            preferences: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_buckets() {
        assert_eq!(
            TimeOfDay::from_time(NaiveTime::from_hms_opt(8, 30, 0).unwrap()),
            TimeOfDay::Morning
        );
        assert_eq!(
            TimeOfDay::from_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()),
            TimeOfDay::Afternoon
        );
        assert_eq!(
            TimeOfDay::from_time(NaiveTime::from_hms_opt(17, 59, 0).unwrap()),
            TimeOfDay::Afternoon
        );
        assert_eq!(
            TimeOfDay::from_time(NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
            TimeOfDay::Evening
        );
    }
}
