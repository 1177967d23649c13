//! Decoded sample history

use super::reading::{Reading, Sample, Timestamp};

/// A reading that carries a numeric value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl HistoryPoint {
    /// (seconds, value) pair for fitting and plotting
    #[must_use]
    #[inline]
    pub fn as_xy(&self) -> (f64, f64) {
        (self.timestamp.epoch_seconds() as f64, self.value)
    }
}

/// Chronological sequence of valid readings
///
/// Built fresh from the log on every read. Unavailable readings are counted
/// but never stored as points, so they cannot be mistaken for a value of 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    points: Vec<HistoryPoint>,
    unavailable: usize,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reading in arrival order
    pub fn push(&mut self, reading: Reading) {
        match reading.sample {
            Sample::Percent(p) => self.points.push(HistoryPoint {
                timestamp: reading.timestamp,
                value: p.get(),
            }),
            Sample::Unavailable => self.unavailable += 1,
        }
    }

    #[must_use]
    pub fn points(&self) -> &[HistoryPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent valid point
    #[must_use]
    pub fn last(&self) -> Option<&HistoryPoint> {
        self.points.last()
    }

    #[must_use]
    pub fn first(&self) -> Option<&HistoryPoint> {
        self.points.first()
    }

    /// Number of readings recorded as unavailable
    #[must_use]
    pub fn unavailable_count(&self) -> usize {
        self.unavailable
    }

    /// All points as (seconds, value) pairs
    pub fn xy(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().map(HistoryPoint::as_xy)
    }
}

impl FromIterator<Reading> for History {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        let mut history = Self::new();
        for reading in iter {
            history.push(reading);
        }
        history
    }
}
