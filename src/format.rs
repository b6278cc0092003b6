//! Text renderings for the display layer.

/// Kilometers with two decimals once the distance rounds to 1000 m, otherwise
/// whole meters.
pub fn format_distance(meters: f64) -> String {
    let rounded = meters.round();
    if rounded >= 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{} m", rounded as i64)
    }
}

/// `M:SS` below one hour, `H:MM:SS` from there on.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

pub fn format_coordinate(latitude: f64, longitude: f64) -> String {
    format!("{:.4}, {:.4}", latitude, longitude)
}
