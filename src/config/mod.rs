//! Configuration module
//!
//! This module handles all configuration types and loading
//! for progress-watch.

mod defaults;
mod loading;
mod types;
mod validation;

// Re-export public types
pub use loading::{
    ConfigSource, ENV_COMMAND, ENV_INTERVAL, ENV_LOG, apply_env_overrides, has_env_overrides,
    load_config, load_config_from_env, load_config_with_fallback, parse_config,
};
pub use types::{Config, DisplayConfig, LogConfig, SamplerConfig, SourceConfig, TrendConfig};

// Re-export default functions for use in tests and other modules
pub use defaults::{
    log_path, max_write_attempts, refresh_interval, sample_interval, source_timeout, threshold,
};
