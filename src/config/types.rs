//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults;
use crate::types::{duration_millis_serde, duration_serde};

/// Top-level configuration
///
/// Every section and field is optional in the TOML file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub trend: TrendConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Sampling loop settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplerConfig {
    /// Time between samples
    #[serde(
        rename = "interval_secs",
        with = "duration_serde",
        default = "defaults::sample_interval"
    )]
    pub interval: Duration,
    /// Append attempts before a write failure becomes fatal
    #[serde(default = "defaults::max_write_attempts")]
    pub max_write_attempts: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: defaults::sample_interval(),
            max_write_attempts: defaults::max_write_attempts(),
        }
    }
}

/// External source settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Program and arguments; must print the percentage or `NaN`
    #[serde(default)]
    pub command: Vec<String>,
    /// Upper bound on one invocation
    #[serde(
        rename = "timeout_secs",
        with = "duration_serde",
        default = "defaults::source_timeout"
    )]
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            timeout: defaults::source_timeout(),
        }
    }
}

/// Progress log settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "defaults::log_path")]
    pub path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: defaults::log_path(),
        }
    }
}

/// Trend projection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendConfig {
    /// Value the crossing projection solves for
    #[serde(default = "defaults::threshold")]
    pub threshold: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::threshold(),
        }
    }
}

/// Live display settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Time between redraws
    #[serde(
        rename = "refresh_ms",
        with = "duration_millis_serde",
        default = "defaults::refresh_interval"
    )]
    pub refresh: Duration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh: defaults::refresh_interval(),
        }
    }
}
