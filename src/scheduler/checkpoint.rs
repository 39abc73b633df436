//! Append-only run-outcome log
//!
//! One JSON line per state transition; the latest record per (job, cycle)
//! wins on read. The single scheduling thread is the only writer, so no
//! locking is needed beyond the append itself. This file is the only state
//! that survives a process restart.

use crate::error::CheckpointError;
use crate::scheduler::job::JobState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub job: String,
    pub cycle: String,
    #[serde(flatten)]
    pub state: JobState,
    pub attempt: u32,
    pub at: DateTime<Utc>,
}

pub struct CheckpointLog {
    path: PathBuf,
}

impl CheckpointLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, record: &TransitionRecord) -> Result<(), CheckpointError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Latest record per (job, cycle). Malformed lines (for example a line
    /// truncated by a crash mid-write) are skipped with a warning, never
    /// fatal.
    pub fn load_latest(
        &self,
    ) -> Result<HashMap<(String, String), TransitionRecord>, CheckpointError> {
        let mut latest = HashMap::new();
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(latest),
            Err(e) => return Err(e.into()),
        };
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TransitionRecord>(&line) {
                Ok(record) => {
                    latest.insert((record.job.clone(), record.cycle.clone()), record);
                }
                Err(e) => {
                    warn!(line = idx + 1, error = %e, "skipping malformed checkpoint line");
                }
            }
        }
        Ok(latest)
    }
}
