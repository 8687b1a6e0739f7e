//! Event Log — Append-only JSONL Audit Trail
//!
//! Every batch run writes its structured outcomes here, one JSON object
//! per line. The log is the operator surface for batch jobs: failures are
//! read from it, not from stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{instrument, warn};

use crate::ports::repository::EventRecord;

/// Append-only JSONL event log.
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Create the log inside the given data directory.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let dir = Path::new(data_dir);
        fs::create_dir_all(dir)
            .await
            .context("Failed to create data directory")?;
        Ok(Self {
            path: dir.join("events.jsonl"),
        })
    }

    /// Append one event; each line is a self-contained JSON record.
    #[instrument(skip(self, event), fields(source = %event.source, outcome = %event.outcome))]
    pub async fn append(&self, event: &EventRecord) -> Result<()> {
        let mut json = serde_json::to_string(event).context("Failed to serialize event")?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .context("Failed to open event log")?;

        file.write_all(json.as_bytes())
            .await
            .context("Failed to write event")?;
        file.flush().await.context("Failed to flush event log")?;

        Ok(())
    }

    /// Load the full event history (for tooling and tests).
    pub async fn load_all(&self) -> Result<Vec<EventRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        let mut events = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EventRecord>(line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed event record");
                }
            }
        }
        Ok(events)
    }

    /// Check the log file is writable.
    pub async fn is_healthy(&self) -> bool {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        let probe = parent.join(".health_check");
        let result = fs::write(&probe, b"ok").await;
        let _ = fs::remove_file(&probe).await;
        result.is_ok()
    }
}
