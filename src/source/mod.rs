//! External progress sources
//!
//! A source produces the current percentage on demand. The sampler treats any
//! error as "unavailable" for that cycle and carries on.

mod command;

pub use command::{CommandSource, parse_output};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Reasons a poll produced no value
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// The external process could not be started
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The external process did not finish within the allowed time
    #[error("source timed out after {0:?}")]
    Timeout(Duration),

    /// The external process exited unsuccessfully
    #[error("source exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },

    /// The source reported that no value is available
    #[error("source reported no value")]
    Unavailable,

    /// The source printed something that is not a number
    #[error("unparseable source output: {0:?}")]
    Parse(String),
}

/// Anything that can report the current progress percentage
#[async_trait]
pub trait ProgressSource: Send + Sync {
    /// Fetch the current value
    async fn poll(&self) -> Result<f64, SourceError>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}
