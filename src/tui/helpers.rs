//! TUI rendering helper functions

use super::constants::chart::X_LABEL_FORMAT;
use crate::constants::display::SINGLE_POINT_X_PAD;
use crate::types::Timestamp;

/// X-axis bounds covering every point
///
/// Pads around a single timestamp so the chart still has a width.
#[must_use]
pub fn x_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| {
            (lo.min(x), hi.max(x))
        });

    if !min.is_finite() {
        let now = Timestamp::now().epoch_seconds() as f64;
        return [now - SINGLE_POINT_X_PAD, now + SINGLE_POINT_X_PAD];
    }
    if max - min < f64::EPSILON {
        return [min - SINGLE_POINT_X_PAD, max + SINGLE_POINT_X_PAD];
    }
    [min, max]
}

/// Clock-time label for an x position
#[must_use]
pub fn time_label(x: f64) -> String {
    Timestamp::from_epoch_seconds_f64(x)
        .map(|t| t.format_with(X_LABEL_FORMAT))
        .unwrap_or_default()
}

/// Start, middle and end labels for the X axis
#[must_use]
pub fn x_labels(bounds: [f64; 2]) -> Vec<String> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    vec![time_label(bounds[0]), time_label(mid), time_label(bounds[1])]
}

/// Clamp points into the visible Y range
///
/// Values outside the axis are drawn on its edge instead of disappearing.
#[must_use]
pub fn clamp_points(points: &[(f64, f64)], y_bounds: [f64; 2]) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|&(x, y)| (x, y.clamp(y_bounds[0], y_bounds[1])))
        .collect()
}
