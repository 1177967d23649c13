//! Tokio runtime configuration and process wiring for the binary
//!
//! This module provides:
//! - Testable runtime configuration and builder logic
//! - Shutdown signal handling
//! - The sampler + reporter wiring shared by TUI and headless modes

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::clock::ClockState;
use crate::config::{Config, ConfigSource, load_config_with_fallback};
use crate::report::Reporter;
use crate::sampler::{Sampler, wait_while_running};
use crate::source::CommandSource;
use crate::store::ProgressLog;
use crate::tui::{self, LogBuffer, TuiApp};
use crate::types::Timestamp;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads
    worker_threads: usize,
}

impl RuntimeConfig {
    /// Create runtime config from optional thread count
    ///
    /// If `threads` is None, defaults to 1 thread.
    /// If `threads` is Some(0), uses number of CPU cores.
    /// Single-threaded runtime is used if threads == 1.
    #[must_use]
    pub fn from_args(threads: Option<usize>) -> Self {
        let worker_threads = match threads {
            None => 1,
            Some(0) => std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1),
            Some(n) => n,
        };

        Self { worker_threads }
    }

    /// Get number of worker threads
    #[must_use]
    pub const fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Check if single-threaded
    #[must_use]
    pub const fn is_single_threaded(&self) -> bool {
        self.worker_threads == 1
    }

    /// Build the tokio runtime
    ///
    /// # Errors
    /// Returns error if runtime creation fails
    pub fn build_runtime(self) -> Result<tokio::runtime::Runtime> {
        let rt = if self.is_single_threaded() {
            tracing::debug!("Using single-threaded runtime");
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
        } else {
            tracing::debug!("Using {} worker threads", self.worker_threads);
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(self.worker_threads)
                .enable_all()
                .build()?
        };

        Ok(rt)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from_args(None)
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM on Unix)
///
/// Returns immediately if a handler cannot be installed, after logging why.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Stop the clock when a shutdown signal arrives
///
/// Everything else observes the cleared flag and winds down on its own.
pub fn spawn_signal_watcher(clock: &Arc<ClockState>) {
    let clock = Arc::clone(clock);
    tokio::spawn(async move {
        shutdown_signal().await;
        if clock.stop() {
            info!("Shutdown signal received");
        }
    });
}

/// Load configuration and log where it came from
///
/// # Errors
/// Returns error if configuration loading fails
pub fn load_and_log_config(config_path: &str) -> Result<(Config, ConfigSource)> {
    let (config, source) = load_config_with_fallback(config_path)?;

    info!("Loaded configuration from {}", source.description());
    info!(
        "Source: {} (timeout {:?}), log: {}",
        config.source.command.join(" "),
        config.source.timeout,
        config.log.path.display()
    );

    Ok((config, source))
}

/// Headless reporter: log the title lines whenever a new sample lands
pub async fn run_headless_reporter(reporter: Reporter, refresh: Duration) {
    let mut last_seen = None;
    while reporter.clock().is_running() {
        let view = reporter.refresh(Timestamp::now()).await;
        let seen = (view.samples, view.unavailable);
        if last_seen != Some(seen) {
            info!("{}", view.title_text());
            last_seen = Some(seen);
        }
        if !wait_while_running(reporter.clock(), refresh).await {
            break;
        }
    }
}

/// Run sampler and reporter until the clock stops
///
/// Returns `Ok` on user-requested termination and the sampler's error if it
/// gave up on the log.
///
/// # Errors
/// Returns error if the TUI fails or the sampler could not write the log
pub async fn run(config: Config, headless: bool, log_buffer: Option<LogBuffer>) -> Result<()> {
    let clock = Arc::new(ClockState::new(Timestamp::now()));
    let log = ProgressLog::new(config.log.path.clone());
    let source = Arc::new(CommandSource::new(
        config.source.command.clone(),
        config.source.timeout,
    ));

    let mut sampler = Sampler::new(source, log.clone(), Arc::clone(&clock), config.sampler.interval)
        .with_max_write_attempts(config.sampler.max_write_attempts);
    let sampler_handle = tokio::spawn(async move { sampler.run().await });

    spawn_signal_watcher(&clock);

    let reporter = Reporter::new(log, Arc::clone(&clock), config.trend.threshold);
    let view_result = if headless {
        run_headless_reporter(reporter, config.display.refresh).await;
        Ok(())
    } else {
        let label = config.log.path.display().to_string();
        let mut app = TuiApp::new(reporter, label);
        if let Some(buffer) = log_buffer {
            app = app.with_log_buffer(buffer);
        }
        tui::run_tui(app, config.display.refresh).await
    };

    // The sampler only exits once the clock stops
    clock.stop();
    let sampler_result = sampler_handle.await.context("Sampler task failed")?;

    view_result?;
    sampler_result?;
    info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_single_threaded() {
        let config = RuntimeConfig::default();
        assert!(config.is_single_threaded());
        assert_eq!(config.worker_threads(), 1);
    }

    #[test]
    fn test_zero_threads_uses_cpu_count() {
        let config = RuntimeConfig::from_args(Some(0));
        assert!(config.worker_threads() >= 1);
    }

    #[test]
    fn test_explicit_threads() {
        let config = RuntimeConfig::from_args(Some(4));
        assert!(!config.is_single_threaded());
        assert_eq!(config.worker_threads(), 4);
    }

    #[test]
    fn test_build_single_threaded_runtime() {
        let rt = RuntimeConfig::from_args(Some(1)).build_runtime().unwrap();
        assert_eq!(rt.block_on(async { 1 + 1 }), 2);
    }

    #[test]
    fn test_build_multi_threaded_runtime() {
        let rt = RuntimeConfig::from_args(Some(2)).build_runtime().unwrap();
        assert_eq!(rt.block_on(async { 2 + 2 }), 4);
    }

    #[tokio::test]
    async fn test_headless_reporter_exits_when_clock_stops() {
        let dir = tempfile::TempDir::new().unwrap();
        let clock = Arc::new(ClockState::new(Timestamp::now()));
        let reporter = Reporter::new(
            ProgressLog::new(dir.path().join("progress.log")),
            Arc::clone(&clock),
            100.0,
        );

        let handle = tokio::spawn(run_headless_reporter(reporter, Duration::from_millis(20)));
        tokio::time::sleep(Duration::from_millis(60)).await;
        clock.stop();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("reporter should exit")
            .unwrap();
    }
}
