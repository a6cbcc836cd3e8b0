//! JSON export/import of the history, wrapped in a versioned envelope.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::{PersistError, PersistResult, ensure_parent_dir};
use crate::record::CalculationRecord;

/// Version number for serialized [`HistoryEnvelope`] payloads.
pub const JSON_FORMAT_VERSION: u16 = 1;

/// Versioned wrapper for stable on-disk decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEnvelope {
    /// Payload format version.
    pub format_version: u16,
    /// Records, oldest first.
    pub records: Vec<CalculationRecord>,
}

impl HistoryEnvelope {
    /// Wraps `records` using [`JSON_FORMAT_VERSION`].
    pub fn new(records: Vec<CalculationRecord>) -> Self {
        Self {
            format_version: JSON_FORMAT_VERSION,
            records,
        }
    }
}

/// Writes `records` to `path`, replacing any previous content.
pub fn export(path: &Path, records: &[CalculationRecord]) -> PersistResult<usize> {
    let envelope = HistoryEnvelope::new(records.to_vec());
    let payload = serde_json::to_vec_pretty(&envelope).map_err(|source| PersistError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    ensure_parent_dir(path)?;
    fs::write(path, payload).map_err(|e| PersistError::access(path, e))?;
    Ok(records.len())
}

/// Reads records previously written by [`export`].
pub fn import(path: &Path) -> PersistResult<Vec<CalculationRecord>> {
    let payload = fs::read(path).map_err(|e| PersistError::access(path, e))?;
    decode(path, &payload)
}

fn decode(path: &Path, payload: &[u8]) -> PersistResult<Vec<CalculationRecord>> {
    match serde_json::from_slice::<HistoryEnvelope>(payload) {
        Ok(envelope) if envelope.format_version == JSON_FORMAT_VERSION => Ok(envelope.records),
        Ok(envelope) => Err(PersistError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: envelope.format_version,
        }),
        // Backward-compatible path for bare record arrays.
        Err(envelope_err) => serde_json::from_slice::<Vec<CalculationRecord>>(payload).map_err(|_| {
            PersistError::Json {
                path: path.to_path_buf(),
                source: envelope_err,
            }
        }),
    }
}
