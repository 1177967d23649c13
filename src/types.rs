//! Core value types for progress samples
//!
//! A [`Reading`] is one timestamped sample as written by the sampler, and
//! [`History`] is the decoded sequence of readings that carry a value.

pub mod duration;
pub mod history;
pub mod reading;

pub use duration::{duration_millis_serde, duration_serde};
pub use history::{History, HistoryPoint};
pub use reading::{Percent, Reading, Sample, TIMESTAMP_FORMAT, Timestamp};
