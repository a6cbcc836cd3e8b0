//! Durable storage of the calculation history.

/// Row-format history file gateway.
pub mod csv;
/// Versioned JSON export and import.
pub mod json;

use std::{io, path::{Path, PathBuf}};

use thiserror::Error;

use crate::record::CalculationRecord;

/// Failure reading or writing a history file.
#[derive(Debug, Error)]
pub enum PersistError {
    /// File missing, unreadable or unwritable.
    #[error("cannot access {}: {source}", path.display())]
    FileAccess {
        /// File involved.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// File present but not in the expected row format.
    #[error("malformed history file {} at line {line}: {reason}", path.display())]
    DataFormat {
        /// File involved.
        path: PathBuf,
        /// 1-based line where the problem starts.
        line: usize,
        /// What was wrong.
        reason: String,
    },
    /// JSON payload could not be encoded or decoded.
    #[error("invalid JSON history in {}: {source}", path.display())]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying serde failure.
        #[source]
        source: serde_json::Error,
    },
    /// JSON envelope written by an unknown format version.
    #[error("unsupported history format version {found} in {}", path.display())]
    UnsupportedVersion {
        /// File involved.
        path: PathBuf,
        /// Version found in the envelope.
        found: u16,
    },
}

impl PersistError {
    pub(crate) fn access(path: &Path, source: io::Error) -> Self {
        Self::FileAccess {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result alias for persistence calls.
pub type PersistResult<T> = Result<T, PersistError>;

/// What a save did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// This many records were written.
    Saved(usize),
    /// History was empty; nothing was written.
    NothingToSave,
}

/// Destination for history rows.
pub trait HistorySink {
    /// Records one new calculation (autosave path).
    fn append_row(&mut self, record: &CalculationRecord) -> PersistResult<()>;
    /// Overwrites stored history with `records`.
    fn save(&mut self, records: &[CalculationRecord]) -> PersistResult<SaveOutcome>;
    /// Reads stored history in file order.
    fn load(&self) -> PersistResult<Vec<CalculationRecord>>;
    /// Location shown to users.
    fn path(&self) -> &Path;
}

pub(crate) fn ensure_parent_dir(path: &Path) -> PersistResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|e| PersistError::access(dir, e))
        }
        _ => Ok(()),
    }
}
