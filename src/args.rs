//! Command-line argument parsing

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::constants::paths;

/// Parse a positive number of seconds
fn parse_interval(s: &str) -> Result<u64, String> {
    let secs: u64 = s.parse().map_err(|e| format!("Invalid interval: {}", e))?;
    if secs == 0 {
        return Err("Interval must be at least 1 second".to_string());
    }
    Ok(secs)
}

/// Parse a finite, positive threshold
fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("Invalid threshold: {}", e))?;
    if !value.is_finite() || value <= 0.0 {
        return Err("Threshold must be a positive number".to_string());
    }
    Ok(value)
}

/// Track a progress percentage and chart its trend toward 100%
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = paths::DEFAULT_CONFIG, env = "PROGRESS_WATCH_CONFIG")]
    pub config: String,

    /// Progress log file (overrides config file)
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Seconds between samples (overrides config file)
    #[arg(short, long, value_parser = parse_interval)]
    pub interval: Option<u64>,

    /// Value the projection solves for (overrides config file)
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Disable TUI and run in headless mode
    #[arg(long, default_value = "false")]
    pub no_tui: bool,

    /// Number of worker threads (default: 1, use 0 for CPU cores)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Source command and its arguments (overrides config file)
    #[arg(last = true)]
    pub command: Vec<String>,
}

impl Args {
    /// Merge command-line overrides into a loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(path) = &self.log_file {
            config.log.path = path.clone();
        }
        if let Some(secs) = self.interval {
            config.sampler.interval = Duration::from_secs(secs);
        }
        if let Some(threshold) = self.threshold {
            config.trend.threshold = threshold;
        }
        if !self.command.is_empty() {
            config.source.command = self.command.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("progress-watch").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.config, "progress-watch.toml");
        assert!(args.log_file.is_none());
        assert!(args.interval.is_none());
        assert!(!args.no_tui);
        assert!(args.command.is_empty());
    }

    #[test]
    fn test_trailing_command() {
        let args = parse(&["--no-tui", "--", "node", "scrape.js", "--headless"]);
        assert!(args.no_tui);
        assert_eq!(args.command, vec!["node", "scrape.js", "--headless"]);
    }

    #[test]
    fn test_overrides_applied() {
        let args = parse(&[
            "--log-file",
            "x.log",
            "--interval",
            "60",
            "--threshold",
            "75",
            "--",
            "echo",
            "5",
        ]);
        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(config.log.path, PathBuf::from("x.log"));
        assert_eq!(config.sampler.interval, Duration::from_secs(60));
        assert_eq!(config.trend.threshold, 75.0);
        assert_eq!(config.source.command, vec!["echo", "5"]);
    }

    #[test]
    fn test_no_overrides_leave_config_alone() {
        let mut config = Config::default();
        parse(&[]).apply_to(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Args::try_parse_from(["progress-watch", "--interval", "0"]).is_err());
        assert!(Args::try_parse_from(["progress-watch", "--interval", "abc"]).is_err());
        assert!(Args::try_parse_from(["progress-watch", "--threshold", "-1"]).is_err());
        assert!(Args::try_parse_from(["progress-watch", "--threshold", "inf"]).is_err());
    }
}
