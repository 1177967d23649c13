//! Linear trend estimation over the sample history
//!
//! Fits `value = slope * seconds + intercept` by ordinary least squares over
//! every valid point, then derives per-horizon deltas and the time at which
//! the fitted line reaches the threshold.

use crate::types::{History, Timestamp};

/// Fixed extrapolation windows for expressing the rate of change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Horizon {
    Minute,
    Hour,
    Day,
    Week,
}

impl Horizon {
    /// All horizons in display order
    pub const ALL: [Horizon; 4] = [Self::Minute, Self::Hour, Self::Day, Self::Week];

    /// Horizon length in minutes
    #[must_use]
    pub const fn minutes(&self) -> f64 {
        match self {
            Self::Minute => 1.0,
            Self::Hour => 60.0,
            Self::Day => 60.0 * 24.0,
            Self::Week => 60.0 * 24.0 * 7.0,
        }
    }

    /// Display label, e.g. "1 Hour"
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Minute => "1 Minute",
            Self::Hour => "1 Hour",
            Self::Day => "1 Day",
            Self::Week => "1 Week",
        }
    }

    /// Unit used after the rate, e.g. "%/hour"
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

/// Least-squares line through (seconds, value) points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Value change per second
    pub slope: f64,
    /// Value at second 0 of the wall-clock axis
    pub intercept: f64,
    /// Coefficient of determination (0 when the values do not vary)
    pub r_squared: f64,
}

impl LinearFit {
    /// Fit a line through the points
    ///
    /// Returns `None` with fewer than 2 points or when every point shares the
    /// same x. Works on mean-centred x so epoch-sized inputs keep precision.
    #[must_use]
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

        let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), &(x, y)| {
            let dx = x - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });
        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let (ss_res, ss_tot) = points.iter().fold((0.0, 0.0), |(res, tot), &(x, y)| {
            let fitted = mean_y + slope * (x - mean_x);
            (res + (y - fitted).powi(2), tot + (y - mean_y).powi(2))
        });
        let r_squared = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else {
            0.0
        };

        Some(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    /// Second at which the line reaches `target`, if it is rising
    #[must_use]
    pub fn solve_for(&self, target: f64) -> Option<f64> {
        (self.slope > 0.0).then(|| (target - self.intercept) / self.slope)
    }
}

/// When the fitted trend reaches the threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Projected wall-clock time of the crossing
    pub at: Timestamp,
    /// Time from "now" to the crossing; negative if it is already in the past
    pub remaining: chrono::Duration,
}

/// Trend derived from a history, recomputed every refresh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendEstimate {
    pub fit: LinearFit,
    /// The target the projection solves for
    pub threshold: f64,
    /// Present only when the slope is positive
    pub projection: Option<Projection>,
}

impl TrendEstimate {
    /// Estimate the trend of `history`, projecting toward `threshold`
    ///
    /// Returns `None` when there is not enough data for a line (fewer than two
    /// points, or all points in the same second).
    #[must_use]
    pub fn estimate(history: &History, threshold: f64, now: Timestamp) -> Option<Self> {
        let points: Vec<(f64, f64)> = history.xy().collect();
        let fit = LinearFit::fit(&points)?;

        let projection = fit
            .solve_for(threshold)
            .and_then(Timestamp::from_epoch_seconds_f64)
            .map(|at| Projection {
                at,
                remaining: at.signed_duration_since(now),
            });

        Some(Self {
            fit,
            threshold,
            projection,
        })
    }

    /// Value per second
    #[must_use]
    #[inline]
    pub fn slope(&self) -> f64 {
        self.fit.slope
    }

    #[must_use]
    #[inline]
    pub fn intercept(&self) -> f64 {
        self.fit.intercept
    }

    /// Expected value change over `horizon` at the fitted rate
    #[must_use]
    pub fn delta(&self, horizon: Horizon) -> f64 {
        self.fit.slope * 60.0 * horizon.minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Reading;

    const T0: i64 = 1_700_000_000;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_epoch_seconds(T0 + secs).unwrap()
    }

    fn history(points: &[(i64, f64)]) -> History {
        points
            .iter()
            .map(|&(s, v)| Reading::percent(at(s), v))
            .collect()
    }

    #[test]
    fn test_horizon_minutes() {
        assert_eq!(Horizon::Minute.minutes(), 1.0);
        assert_eq!(Horizon::Hour.minutes(), 60.0);
        assert_eq!(Horizon::Day.minutes(), 1440.0);
        assert_eq!(Horizon::Week.minutes(), 10080.0);
    }

    #[test]
    fn test_horizon_labels() {
        let labels: Vec<_> = Horizon::ALL.iter().map(Horizon::label).collect();
        assert_eq!(labels, ["1 Minute", "1 Hour", "1 Day", "1 Week"]);
        assert_eq!(Horizon::Week.unit(), "week");
    }

    #[test]
    fn test_insufficient_history() {
        assert!(TrendEstimate::estimate(&History::new(), 100.0, at(0)).is_none());
        assert!(TrendEstimate::estimate(&history(&[(0, 5.0)]), 100.0, at(0)).is_none());
    }

    #[test]
    fn test_same_second_points_are_insufficient() {
        let h = history(&[(0, 5.0), (0, 6.0), (0, 7.0)]);
        assert!(TrendEstimate::estimate(&h, 100.0, at(0)).is_none());
    }

    #[test]
    fn test_two_point_deltas() {
        let h = history(&[(0, 10.0), (60, 20.0)]);
        let est = TrendEstimate::estimate(&h, 100.0, at(60)).unwrap();

        assert!((est.delta(Horizon::Minute) - 10.0).abs() < 1e-9);
        assert!((est.delta(Horizon::Hour) - 600.0).abs() < 1e-6);
        assert!((est.delta(Horizon::Day) - 14_400.0).abs() < 1e-4);
        assert!((est.delta(Horizon::Week) - 100_800.0).abs() < 1e-3);
    }

    #[test]
    fn test_two_point_projection() {
        // 10 per minute from 20 at t=60 reaches 100 eight minutes later
        let h = history(&[(0, 10.0), (60, 20.0)]);
        let est = TrendEstimate::estimate(&h, 100.0, at(60)).unwrap();

        let projection = est.projection.unwrap();
        assert_eq!(projection.at, at(540));
        assert_eq!(projection.remaining, chrono::Duration::seconds(480));
    }

    #[test]
    fn test_exact_line_recovers_parameters() {
        let m = 0.001;
        let b = 5.0 - m * T0 as f64;
        let pts: Vec<(i64, f64)> = (0..10)
            .map(|i| {
                let s = i * 300;
                (s, m * (T0 + s) as f64 + b)
            })
            .collect();
        let est = TrendEstimate::estimate(&history(&pts), 100.0, at(0)).unwrap();

        assert!((est.slope() - m).abs() < 1e-12);
        assert!((est.intercept() - b).abs() / b.abs() < 1e-9);
        assert!((est.fit.r_squared - 1.0).abs() < 1e-9);

        let target_x = (100.0 - b) / m;
        let projection = est.projection.unwrap();
        assert!((projection.at.epoch_seconds() as f64 - target_x).abs() <= 1.0);
    }

    #[test]
    fn test_flat_trend_has_no_projection() {
        let h = history(&[(0, 50.0), (60, 50.0), (120, 50.0)]);
        let est = TrendEstimate::estimate(&h, 100.0, at(120)).unwrap();
        assert_eq!(est.slope(), 0.0);
        assert!(est.projection.is_none());
        assert_eq!(est.delta(Horizon::Hour), 0.0);
        assert_eq!(est.fit.r_squared, 0.0);
    }

    #[test]
    fn test_falling_trend_has_no_projection() {
        let h = history(&[(0, 50.0), (60, 40.0), (120, 30.0)]);
        let est = TrendEstimate::estimate(&h, 100.0, at(120)).unwrap();
        assert!(est.slope() < 0.0);
        assert!(est.projection.is_none());
        assert!(est.delta(Horizon::Minute) < 0.0);
    }

    #[test]
    fn test_overshoot_gives_negative_remaining() {
        // Fitted line crossed 100 before "now"
        let h = history(&[(0, 90.0), (60, 100.0), (120, 110.0)]);
        let est = TrendEstimate::estimate(&h, 100.0, at(120)).unwrap();
        let projection = est.projection.unwrap();
        assert_eq!(projection.at, at(60));
        assert_eq!(projection.remaining, chrono::Duration::seconds(-60));
    }

    #[test]
    fn test_custom_threshold() {
        let h = history(&[(0, 10.0), (60, 20.0)]);
        let est = TrendEstimate::estimate(&h, 50.0, at(60)).unwrap();
        assert_eq!(est.threshold, 50.0);
        assert_eq!(est.projection.unwrap().at, at(240));
    }

    #[test]
    fn test_noisy_fit_r_squared_between_zero_and_one() {
        let h = history(&[(0, 10.0), (60, 14.0), (120, 12.0), (180, 18.0)]);
        let est = TrendEstimate::estimate(&h, 100.0, at(180)).unwrap();
        assert!(est.fit.r_squared > 0.0 && est.fit.r_squared < 1.0);
    }
}
