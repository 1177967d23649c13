//! Logging setup: TUI log pane or stdout, plus debug.log
//!
//! Both outputs honour `RUST_LOG`, defaulting to `info`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::constants::paths::DEBUG_LOG;
use crate::tui::{LogBuffer, LogMakeWriter};

/// Keeps the debug.log writer alive; drop it last to flush pending lines
pub type LogGuard = tracing_appender::non_blocking::WorkerGuard;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize logging
///
/// Headless mode logs to stdout. TUI mode captures lines in a [`LogBuffer`]
/// shown inside the dashboard, since stdout belongs to the terminal UI.
/// Both modes also write to `debug.log` in the working directory.
pub fn init_logging(headless: bool) -> (LogGuard, Option<LogBuffer>) {
    let file_appender = tracing_appender::rolling::never(".", DEBUG_LOG);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    if headless {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_filter(env_filter()),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_filter(env_filter()),
            )
            .init();
        return (guard, None);
    }

    let log_buffer = LogBuffer::default();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(LogMakeWriter::new(log_buffer.clone()))
                .with_ansi(false)
                .with_target(false)
                .compact()
                .with_filter(env_filter()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(env_filter()),
        )
        .init();

    (guard, Some(log_buffer))
}
