use serde::{Deserialize, Serialize};

/// Display window for an activity, as shown in the catalog ("6:00 AM",
/// "10:00 PM"). Free-form text, parsed leniently by the index.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

/// A catalog entry. The catalog is loaded once per process and activities
/// are never mutated afterwards; `title` is the unique key.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Activity {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub time_window: TimeWindow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<(f64, f64)>,
}

impl Activity {
    pub fn new(title: &str, description: &str, tags: &[&str], window: TimeWindow) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            time_window: window,
            duration_minutes: None,
            peak_hours: None,
            coordinates: None,
        }
    }

    pub fn with_duration(mut self, minutes: u16) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_peak_hours(mut self, peak_hours: &str) -> Self {
        self.peak_hours = Some(peak_hours.to_string());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some((lat, lng));
        self
    }
}
