use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::category::Category;

/// File the session log is read from and written to when `--data` is not given.
pub const DEFAULT_LOG_FILE: &str = "time-tracker.json";

/// A closed session: one tracked interval of work.
///
/// Immutable once created. Persisted as `{"start", "end", "task"}` with the
/// comment as an optional extra field, so files written before comments
/// existed load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    #[serde(rename = "task")]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed time log {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Owner of the ordered, durable sequence of completed entries.
///
/// The in-memory sequence is newest-first and fully materialized; every
/// append rewrites the whole file. A failed write leaves the in-memory
/// sequence authoritative for the rest of the run.
#[derive(Debug)]
pub struct TimeLog {
    path: PathBuf,
    entries: Vec<LogEntry>,
}

impl TimeLog {
    /// Reads the durable file and reconstructs the sequence in its stored
    /// order. A missing file or blank content initializes an empty log and
    /// writes it out immediately; an unreadable or malformed file is fatal,
    /// never silently replaced.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                let log = Self {
                    path: path.clone(),
                    entries: Vec::new(),
                };
                log.persist().map_err(|source| LoadError::Io { path, source })?;
                return Ok(log);
            }
            Err(source) => return Err(LoadError::Io { path, source }),
        };

        if content.trim().is_empty() {
            let log = Self {
                path: path.clone(),
                entries: Vec::new(),
            };
            log.persist().map_err(|source| LoadError::Io { path, source })?;
            return Ok(log);
        }

        let entries = serde_json::from_str(&content)
            .map_err(|source| LoadError::Malformed { path: path.clone(), source })?;

        Ok(Self { path, entries })
    }

    /// Prepends `entry` and rewrites the file. The entry stays in the
    /// in-memory sequence even when the write fails; the error is reported
    /// but never retried.
    pub fn append(&mut self, entry: LogEntry) -> io::Result<()> {
        self.entries.insert(0, entry);
        self.persist()
    }

    fn persist(&self) -> io::Result<()> {
        let data = serde_json::to_vec_pretty(&self.entries)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, data)
    }

    /// The `n` most recently completed entries, newest first.
    pub fn recent(&self, n: usize) -> &[LogEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
