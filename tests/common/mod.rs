use itinerary_engine::models::activity::{Activity, TimeWindow};
use itinerary_engine::models::context::SearchContext;

/// Initialize env_logger once for a test binary; repeated calls are fine.
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A small Baguio City catalog covering every category the engine scores.
pub fn baguio_catalog() -> Vec<Activity> {
    vec![
        Activity::new(
            "Burnham Park",
            "Rowboats on the lagoon, bike rentals, and landscaped gardens in the city center",
            &["Nature & Scenery"],
            TimeWindow::new("6:00 AM", "10:00 PM"),
        )
        .with_coordinates(16.4109, 120.5950)
        .with_peak_hours("10:00-14:00"),
        Activity::new(
            "BenCab Museum",
            "Contemporary art and Cordillera artifacts with a view of the valley",
            &["Culture & Arts"],
            TimeWindow::new("9:00 AM", "6:00 PM"),
        )
        .with_duration(120)
        .with_coordinates(16.3853, 120.5593),
        Activity::new(
            "Cafe by the Ruins",
            "Heritage dining with local coffee and Cordilleran dishes",
            &["Food & Drinks"],
            TimeWindow::new("7:00 AM", "9:00 PM"),
        )
        .with_duration(90),
        Activity::new(
            "Mines View Point",
            "Observation deck over the old mining town and the Amburayan valley",
            &["Nature & Scenery"],
            TimeWindow::new("6:00 AM", "8:00 PM"),
        )
        .with_peak_hours("8 AM - 11 AM")
        .with_coordinates(16.4225, 120.6263),
        Activity::new(
            "Baguio Night Market",
            "Street food and thrift stalls along Harrison Road",
            &["Shopping", "Nightlife"],
            TimeWindow::new("9:00 PM", "2:00 AM"),
        )
        .with_duration(90),
        Activity::new(
            "Camp John Hay Yellow Trail",
            "Pine forest hike past the historic amphitheater",
            &["Adventure", "Nature & Scenery"],
            TimeWindow::new("6:00 AM", "6:00 PM"),
        )
        .with_duration(120),
        Activity::new(
            "Tam-awan Village",
            "Reconstructed Ifugao huts, art workshops, and cultural shows",
            &["Culture & Arts"],
            TimeWindow::new("8:00 AM", "6:00 PM"),
        ),
        Activity::new(
            "SM City Baguio Shopping",
            "Open-air mall above Session Road",
            &["Shopping"],
            TimeWindow::new("10:00 AM", "9:00 PM"),
        ),
    ]
}

pub fn default_context() -> SearchContext {
    SearchContext::default()
}
