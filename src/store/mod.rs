//! Durable storage for progress readings
//!
//! The log is the only thing the sampler and the reporter share besides the
//! clock: the sampler appends, and every reader decodes the whole file again.

pub mod codec;
mod file;

pub use file::ProgressLog;

use std::path::PathBuf;
use thiserror::Error;

/// Errors touching the progress log file
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LogError {
    #[error("failed to append to progress log '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read progress log '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
