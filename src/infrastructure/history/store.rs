//! File-backed scan record history store.
//!
//! One JSON document per build number under the configured directory.
//! The chain is append-only: each review writes its own build's record
//! exactly once at the end; lookups never mutate prior builds.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::domain::models::scan_record::ScanRecord;
use crate::domain::ports::build_history::{BuildHistoryProvider, BuildRef};

/// Errors from the history store.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// History store keeping one `{build_number}.json` per recorded build.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    dir: PathBuf,
}

impl FileHistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, build: &BuildRef) -> PathBuf {
        self.dir.join(format!("{}.json", build.number))
    }

    /// Persist the record for a build. Called exactly once per review.
    pub fn store_record(&self, build: &BuildRef, record: &ScanRecord) -> Result<(), HistoryError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.record_path(build), json)?;
        Ok(())
    }

    /// Build numbers with a stored record, ascending.
    pub fn recorded_builds(&self) -> Result<Vec<BuildRef>, HistoryError> {
        let mut numbers = Vec::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(numbers),
            Err(err) => return Err(err.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if let Some(number) = build_number_of(&path) {
                numbers.push(BuildRef::new(number));
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }

    fn read_record(&self, build: &BuildRef) -> Option<ScanRecord> {
        let path = self.record_path(build);
        let raw = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                // A corrupt record behaves like a build without data.
                warn!(path = %path.display(), error = %err, "ignoring unreadable scan record");
                None
            }
        }
    }
}

fn build_number_of(path: &Path) -> Option<u64> {
    if path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

impl BuildHistoryProvider for FileHistoryStore {
    fn previous_build(&self, build: &BuildRef) -> Option<BuildRef> {
        self.recorded_builds()
            .ok()?
            .into_iter()
            .filter(|candidate| candidate.number < build.number)
            .next_back()
    }

    fn scan_record(&self, build: &BuildRef) -> Option<ScanRecord> {
        self.read_record(build)
    }
}
