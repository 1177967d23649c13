//! Configuration validation
//!
//! Checked once after file, environment and CLI values are merged.

use anyhow::Result;

use super::types::Config;

impl Config {
    /// Validate configuration for correctness
    ///
    /// Checks for:
    /// - A source command to run
    /// - Non-zero interval, timeout and refresh
    /// - At least one write attempt
    /// - A finite, positive threshold
    pub fn validate(&self) -> Result<()> {
        if self.source.command.is_empty() || self.source.command[0].trim().is_empty() {
            return Err(anyhow::anyhow!(
                "No source command configured: set source.command in the config file, \
                 PROGRESS_WATCH_COMMAND, or pass it after `--`"
            ));
        }
        if self.sampler.interval.is_zero() {
            return Err(anyhow::anyhow!("sampler.interval_secs must be > 0"));
        }
        if self.sampler.max_write_attempts == 0 {
            return Err(anyhow::anyhow!("sampler.max_write_attempts must be > 0"));
        }
        if self.source.timeout.is_zero() {
            return Err(anyhow::anyhow!("source.timeout_secs must be > 0"));
        }
        if self.display.refresh.is_zero() {
            return Err(anyhow::anyhow!("display.refresh_ms must be > 0"));
        }
        if !self.trend.threshold.is_finite() || self.trend.threshold <= 0.0 {
            return Err(anyhow::anyhow!(
                "trend.threshold must be a positive number, got {}",
                self.trend.threshold
            ));
        }
        if self.source.timeout > self.sampler.interval {
            tracing::warn!(
                "source.timeout_secs ({:?}) exceeds sampler.interval_secs ({:?}); \
                 a hung source will delay samples",
                self.source.timeout,
                self.sampler.interval
            );
        }

        Ok(())
    }
}
