//! Report assembly for the live view
//!
//! Every refresh re-reads the log, recomputes the trend and produces a
//! [`ReportView`]: the series to plot and the descriptive title lines.

use std::sync::Arc;
use tracing::warn;

use crate::clock::ClockState;
use crate::constants::display::NOT_AVAILABLE;
use crate::store::ProgressLog;
use crate::trend::{Horizon, TrendEstimate};
use crate::types::{History, Timestamp};

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    /// (seconds, value) points in chronological order
    pub points: Vec<(f64, f64)>,
    /// Multi-line title, top to bottom
    pub title: Vec<String>,
    /// Trend behind the title, if there was enough data
    pub estimate: Option<TrendEstimate>,
    /// Number of valid samples
    pub samples: usize,
    /// Number of samples recorded as unavailable
    pub unavailable: usize,
}

impl ReportView {
    /// Build a view from an already-decoded history
    #[must_use]
    pub fn build(history: &History, clock: &ClockState, now: Timestamp, threshold: f64) -> Self {
        let estimate = TrendEstimate::estimate(history, threshold, now);

        let mut title = Vec::with_capacity(8);
        title.push(format!(
            "Next fetch in {} seconds",
            clock.seconds_until_next_sample(now)
        ));
        title.push(format!(
            "Current Progress: {}%",
            history
                .last()
                .map_or_else(|| NOT_AVAILABLE.to_string(), |p| format!("{:.3}", p.value))
        ));
        title.extend(Horizon::ALL.iter().map(|h| delta_line(estimate.as_ref(), *h)));

        if let Some(projection) = estimate.as_ref().and_then(|e| e.projection) {
            title.push(format!("Projected {}% at {}", threshold, projection.at));
            title.push(format!(
                "Time remaining: {}",
                format_remaining(projection.remaining)
            ));
        }

        Self {
            points: history.xy().collect(),
            title,
            estimate,
            samples: history.len(),
            unavailable: history.unavailable_count(),
        }
    }

    /// Title on a single line, as logged when running without the TUI
    #[must_use]
    pub fn title_text(&self) -> String {
        self.title.join(" | ")
    }
}

fn delta_line(estimate: Option<&TrendEstimate>, horizon: Horizon) -> String {
    match estimate {
        Some(e) => format!(
            "{}Δ: {:.3}%/{}",
            horizon.label(),
            e.delta(horizon),
            horizon.unit()
        ),
        None => format!("{}Δ: {}", horizon.label(), NOT_AVAILABLE),
    }
}

/// Format a signed duration as `[-][Nd ]HH:MM:SS`
///
/// Negative values are kept: they mean the projected crossing is in the past.
#[must_use]
pub fn format_remaining(remaining: chrono::Duration) -> String {
    let total = remaining.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let secs = total.unsigned_abs();
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (h, m, s) = (rem / 3600, (rem % 3600) / 60, rem % 60);

    if days > 0 {
        format!("{}{}d {:02}:{:02}:{:02}", sign, days, h, m, s)
    } else {
        format!("{}{:02}:{:02}:{:02}", sign, h, m, s)
    }
}

/// Produces report views from the shared log and clock
#[derive(Debug, Clone)]
pub struct Reporter {
    log: ProgressLog,
    clock: Arc<ClockState>,
    threshold: f64,
}

impl Reporter {
    pub fn new(log: ProgressLog, clock: Arc<ClockState>, threshold: f64) -> Self {
        Self {
            log,
            clock,
            threshold,
        }
    }

    #[must_use]
    pub fn clock(&self) -> &Arc<ClockState> {
        &self.clock
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Re-read the log and build a fresh view
    ///
    /// A log that cannot be read produces an empty view; the failure is logged
    /// rather than tearing down the display.
    pub async fn refresh(&self, now: Timestamp) -> ReportView {
        let history = match self.log.read_history().await {
            Ok(history) => history,
            Err(e) => {
                warn!("{}", e);
                History::new()
            }
        };
        ReportView::build(&history, &self.clock, now, self.threshold)
    }
}
