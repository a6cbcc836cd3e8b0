//! In-memory history and its undo/redo caretaker.

use thiserror::Error;

/// Undo/redo stacks of history snapshots.
pub mod caretaker;
/// Bounded history log and its snapshots.
pub mod history;

/// Failure inside the history subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// A load was attempted into a log that already holds records.
    #[error("existing history cannot be overridden")]
    WouldOverrideExisting,
    /// A snapshot holds more records than the log may contain.
    #[error("snapshot of {len} records exceeds the history bound of {max}")]
    SnapshotExceedsCapacity {
        /// Records in the snapshot.
        len: usize,
        /// Log capacity.
        max: usize,
    },
}
