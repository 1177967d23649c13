//! Default values for configuration fields
//!
//! This module centralizes all default value functions used in serde deserialization.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{display, paths, sampling, trend};

/// Default time between samples
#[inline]
pub fn sample_interval() -> Duration {
    Duration::from_secs(sampling::DEFAULT_INTERVAL_SECS)
}

/// Default log append attempts before the sampler gives up
#[inline]
pub fn max_write_attempts() -> u32 {
    sampling::DEFAULT_MAX_WRITE_ATTEMPTS
}

/// Default bound on one source invocation
#[inline]
pub fn source_timeout() -> Duration {
    Duration::from_secs(sampling::DEFAULT_SOURCE_TIMEOUT_SECS)
}

/// Default progress log location
#[inline]
pub fn log_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_LOG)
}

/// Default projection target
#[inline]
pub fn threshold() -> f64 {
    trend::DEFAULT_THRESHOLD
}

/// Default display refresh cadence
#[inline]
pub fn refresh_interval() -> Duration {
    Duration::from_millis(display::DEFAULT_REFRESH_MS)
}
