//! Append-only progress log on disk

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use super::LogError;
use super::codec;
use crate::types::{History, Reading};

/// Durable log of readings, one line per reading
///
/// Only the sampler appends; any number of readers may re-read the whole
/// file concurrently. Each append is a single `write_all` of a complete
/// line, and readers skip anything that does not decode.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one reading
    ///
    /// If the file ends in a partial line (an interrupted earlier write), a
    /// newline is written first so the new reading stays on its own line.
    ///
    /// # Errors
    /// Returns [`LogError::Write`] if the file cannot be opened or written.
    pub async fn append(&self, reading: &Reading) -> Result<(), LogError> {
        let mut line = codec::encode(reading);
        line.push('\n');

        let write = async {
            let mut file = OpenOptions::new()
                .create(true)
                .read(true)
                .append(true)
                .open(&self.path)
                .await?;
            if !ends_with_newline(&mut file).await? {
                line.insert(0, '\n');
            }
            file.write_all(line.as_bytes()).await?;
            file.flush().await
        };

        write.await.map_err(|source| LogError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Read and decode the full log
    ///
    /// A log that does not exist yet is an empty history.
    ///
    /// # Errors
    /// Returns [`LogError::Read`] for any other I/O failure.
    pub async fn read_history(&self) -> Result<History, LogError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(codec::decode_history(&String::from_utf8_lossy(&bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(History::new()),
            Err(source) => Err(LogError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// True for an empty file or one whose last byte is `\n`
async fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata().await?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] == b'\n')
}
