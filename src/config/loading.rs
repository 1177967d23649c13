//! Configuration loading from files and environment variables
//!
//! Environment variables take precedence over the file:
//! - `PROGRESS_WATCH_COMMAND` - source command, split on whitespace
//! - `PROGRESS_WATCH_LOG` - progress log path
//! - `PROGRESS_WATCH_INTERVAL` - seconds between samples
//!
//! Loading does not validate; call [`Config::validate`] after command-line
//! overrides have been applied.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::Config;

pub const ENV_COMMAND: &str = "PROGRESS_WATCH_COMMAND";
pub const ENV_LOG: &str = "PROGRESS_WATCH_LOG";
pub const ENV_INTERVAL: &str = "PROGRESS_WATCH_INTERVAL";

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from a TOML file
    File(PathBuf),
    /// No file; built from environment variables
    Environment,
    /// No file and no environment variables
    Default,
}

impl ConfigSource {
    /// Human-readable description for startup logging
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::File(path) => format!("config file '{}'", path.display()),
            Self::Environment => "environment variables".to_string(),
            Self::Default => "built-in defaults".to_string(),
        }
    }
}

/// Apply environment overrides using `lookup` to read variables
///
/// Returns `true` if any override was applied. Unparseable values are
/// logged and ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = false;

    if let Some(command) = lookup(ENV_COMMAND) {
        let argv: Vec<String> = command.split_whitespace().map(String::from).collect();
        if !argv.is_empty() {
            config.source.command = argv;
            applied = true;
        }
    }

    if let Some(path) = lookup(ENV_LOG).filter(|p| !p.trim().is_empty()) {
        config.log.path = PathBuf::from(path);
        applied = true;
    }

    if let Some(interval) = lookup(ENV_INTERVAL) {
        match interval.trim().parse::<u64>() {
            Ok(secs) => {
                config.sampler.interval = Duration::from_secs(secs);
                applied = true;
            }
            Err(e) => tracing::warn!("Ignoring {}={:?}: {}", ENV_INTERVAL, interval, e),
        }
    }

    applied
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Check whether any configuration environment variable is set
#[must_use]
pub fn has_env_overrides() -> bool {
    [ENV_COMMAND, ENV_LOG, ENV_INTERVAL]
        .iter()
        .any(|k| std::env::var_os(k).is_some())
}

/// Parse a TOML configuration string
///
/// # Errors
/// Returns an error if the TOML is invalid.
pub fn parse_config(content: &str, origin: &str) -> Result<Config> {
    toml::from_str(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", origin, e))
}

/// Load configuration from a TOML file, with environment variable overrides
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(config_path: &str) -> Result<Config> {
    let config_content = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", config_path, e))?;

    let mut config = parse_config(&config_content, config_path)?;

    if apply_env_overrides(&mut config, process_env) {
        tracing::info!("Applied environment variable overrides to {}", config_path);
    }

    Ok(config)
}

/// Build configuration from environment variables over defaults
#[must_use]
pub fn load_config_from_env() -> Config {
    let mut config = Config::default();
    apply_env_overrides(&mut config, process_env);
    config
}

/// Load configuration with automatic fallback
///
/// Uses the file if it exists, otherwise environment variables, otherwise
/// defaults.
///
/// # Errors
/// Returns an error if an existing file cannot be read or parsed.
pub fn load_config_with_fallback(config_path: &str) -> Result<(Config, ConfigSource)> {
    if Path::new(config_path).exists() {
        let config = load_config(config_path)?;
        return Ok((config, ConfigSource::File(PathBuf::from(config_path))));
    }

    if has_env_overrides() {
        return Ok((load_config_from_env(), ConfigSource::Environment));
    }

    Ok((Config::default(), ConfigSource::Default))
}
