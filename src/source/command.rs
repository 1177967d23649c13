//! Source backed by an external command
//!
//! The command is expected to print a single number (the percentage) or
//! `NaN` on stdout. This is how the headless-browser scraper is plugged in.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use super::{ProgressSource, SourceError};
use crate::store::codec::UNAVAILABLE_TOKEN;

/// Maximum stderr excerpt carried in an error
const STDERR_EXCERPT: usize = 200;

/// Runs an argv and parses its stdout
#[derive(Debug, Clone)]
pub struct CommandSource {
    argv: Vec<String>,
    timeout: Duration,
}

impl CommandSource {
    /// Create a command source
    ///
    /// `argv[0]` is the program; an empty argv fails every poll with a spawn error.
    #[must_use]
    pub fn new(argv: Vec<String>, timeout: Duration) -> Self {
        Self { argv, timeout }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn program(&self) -> &str {
        self.argv.first().map_or("", String::as_str)
    }
}

#[async_trait]
impl ProgressSource for CommandSource {
    async fn poll(&self) -> Result<f64, SourceError> {
        let Some((program, args)) = self.argv.split_first() else {
            return Err(SourceError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SourceError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Dropping the future on timeout drops the child, which kills it
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| SourceError::Timeout(self.timeout))?
            .map_err(|source| SourceError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr: String = stderr.trim().chars().take(STDERR_EXCERPT).collect();
            return Err(SourceError::ExitStatus {
                status: output.status.to_string(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("Source '{}' printed {:?}", program, stdout.trim());
        parse_output(&stdout)
    }

    fn describe(&self) -> String {
        format!("command '{}' (timeout {:?})", self.program(), self.timeout)
    }
}

/// Parse the text printed by a source
///
/// Uses the last non-empty line so that tools printing banners first still work.
///
/// # Errors
/// [`SourceError::Unavailable`] for `NaN`, [`SourceError::Parse`] for anything
/// that is not a finite number.
pub fn parse_output(stdout: &str) -> Result<f64, SourceError> {
    let text = stdout
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .unwrap_or("");
    let text = text.trim_end_matches('%').trim();

    if text.eq_ignore_ascii_case(UNAVAILABLE_TOKEN) {
        return Err(SourceError::Unavailable);
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SourceError::Parse(text.to_string())),
    }
}
