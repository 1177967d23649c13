//! Constants used throughout progress-watch
//!
//! Centralizes cadences, chart bounds and retry timings.

use std::time::Duration;

/// Granularity of cancellable waits
///
/// Bounds how long the sampler takes to notice a shutdown request while it
/// sleeps between samples or between write retries.
pub const SHUTDOWN_POLL: Duration = Duration::from_millis(250);

/// Sampling cadence
pub mod sampling {
    /// Seconds between samples (5 minutes)
    pub const DEFAULT_INTERVAL_SECS: u64 = 5 * 60;

    /// Upper bound on one external source invocation (2 minutes)
    ///
    /// A headless browser pulling a full page can take a while, but a hung
    /// process must not stall the sampler past its own interval.
    pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 120;

    /// Log append attempts before the sampler gives up
    pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 5;
}

/// Backoff between failed log appends
pub mod write_backoff {
    use std::time::Duration;

    pub const INITIAL: Duration = Duration::from_secs(1);
    pub const MAX: Duration = Duration::from_secs(30);
}

/// Trend projection
pub mod trend {
    /// Value the projection solves for
    pub const DEFAULT_THRESHOLD: f64 = 100.0;
}

/// Live display
pub mod display {
    /// Refresh cadence of the reporter (1 second)
    pub const DEFAULT_REFRESH_MS: u64 = 1000;

    /// Fixed chart Y range
    pub const Y_BOUNDS: [f64; 2] = [0.0, 100.0];

    /// X padding (seconds) used when all points share one timestamp
    pub const SINGLE_POINT_X_PAD: f64 = 60.0;

    /// Placeholder for values that cannot be computed yet
    pub const NOT_AVAILABLE: &str = "N/A";
}

/// File locations
pub mod paths {
    pub const DEFAULT_CONFIG: &str = "progress-watch.toml";
    pub const DEFAULT_LOG: &str = "progress.log";
    pub const DEBUG_LOG: &str = "debug.log";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_poll_shorter_than_interval() {
        assert!(SHUTDOWN_POLL < Duration::from_secs(sampling::DEFAULT_INTERVAL_SECS));
        assert!(SHUTDOWN_POLL <= Duration::from_millis(display::DEFAULT_REFRESH_MS));
    }

    #[test]
    fn test_source_timeout_within_interval() {
        assert!(sampling::DEFAULT_SOURCE_TIMEOUT_SECS < sampling::DEFAULT_INTERVAL_SECS);
    }

    #[test]
    fn test_write_backoff_ordering() {
        assert!(write_backoff::INITIAL < write_backoff::MAX);
    }

    #[test]
    fn test_y_bounds() {
        assert_eq!(display::Y_BOUNDS, [0.0, 100.0]);
        assert_eq!(trend::DEFAULT_THRESHOLD, display::Y_BOUNDS[1]);
    }
}
