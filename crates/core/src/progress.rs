//! Percentage arithmetic behind the progress tube.

/// Quick-add increment for the "+30m" action.
pub const QUICK_ADD_HALF_HOUR: f64 = 0.5;
/// Quick-add increment for the "+1h" action.
pub const QUICK_ADD_HOUR: f64 = 1.0;

/// Fill level in percent, capped at 100. Zero when the target is not positive.
#[must_use]
pub fn fill_percentage(total_hours: f64, target_hours: f64) -> f64 {
    if target_hours > 0.0 {
        (total_hours / target_hours * 100.0).min(100.0)
    } else {
        0.0
    }
}

/// Height of a marker line in percent of the tube, capped at 100.
///
/// `None` when the target is not positive; such markers are not drawn.
#[must_use]
pub fn marker_position(marker_hours: f64, target_hours: f64) -> Option<f64> {
    if target_hours <= 0.0 {
        return None;
    }
    Some((marker_hours / target_hours * 100.0).min(100.0))
}

/// Parses a user-typed custom amount. Only finite, positive numbers count.
#[must_use]
pub fn parse_custom_hours(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|h| h.is_finite() && *h > 0.0)
}

/// Formats hours with one decimal place, e.g. `25.0h`.
#[must_use]
pub fn format_hours(hours: f64) -> String {
    format!("{hours:.1}h")
}
