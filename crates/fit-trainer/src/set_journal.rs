//! JSON-lines journal of completed sets

use fit_core::{FitError, FitResult};
use fit_processing::{SessionEvent, SetRecord};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Append-only set log, one `SetRecord` per line
#[derive(Debug, Clone)]
pub struct SetJournal {
    path: PathBuf,
}

impl SetJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SetJournal { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file if needed
    pub async fn append(&self, record: &SetRecord) -> FitResult<()> {
        let mut line = serde_json::to_string(record).map_err(|e| FitError::SerializationError {
            reason: format!("Failed to serialize set record: {}", e),
        })?;
        line.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Every record in the journal; a missing file is an empty journal
    pub fn read_all(&self) -> FitResult<Vec<SetRecord>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| FitError::SerializationError {
                reason: format!("Journal line {} is not a set record: {}", number + 1, e),
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Journal every completed set until the event channel closes.
    /// Returns the number of records written.
    pub async fn run(self, mut events: broadcast::Receiver<SessionEvent>) -> u32 {
        let mut written = 0;
        loop {
            match events.recv().await {
                Ok(SessionEvent::SetComplete(record)) => match self.append(&record).await {
                    Ok(()) => {
                        written += 1;
                        info!(path = %self.path.display(), set = record.set_number, "Set journaled");
                    }
                    Err(e) => warn!(error = %e, "Failed to journal set"),
                },
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Journal lagged; completed sets may be missing");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        written
    }
}
