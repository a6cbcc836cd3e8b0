//! History events and the observers that receive them.

use std::path::PathBuf;

use tracing::info;

use crate::record::CalculationRecord;

/// Events emitted by the calculator session after each state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    /// A calculation succeeded and was appended.
    Calculated {
        /// Appended record.
        record: CalculationRecord,
    },
    /// One undo step was applied.
    Undone {
        /// Record that disappeared, if any.
        record: Option<CalculationRecord>,
    },
    /// One redo step was applied.
    Redone {
        /// Record that reappeared, if any.
        record: Option<CalculationRecord>,
    },
    /// The in-memory history was emptied.
    Cleared {
        /// Records removed.
        removed: usize,
    },
    /// History was written to disk.
    Saved {
        /// Records written.
        count: usize,
        /// Destination file.
        path: PathBuf,
    },
    /// History was initialized from disk.
    Loaded {
        /// Records loaded.
        count: usize,
        /// Source file.
        path: PathBuf,
    },
}

/// Receiver of [`HistoryEvent`]s.
pub trait HistoryObserver {
    /// Called once per event, in emission order.
    fn notify(&mut self, event: &HistoryEvent);
}

impl<F: FnMut(&HistoryEvent)> HistoryObserver for F {
    fn notify(&mut self, event: &HistoryEvent) {
        self(event)
    }
}

/// Writes every event to the `tracing` pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl HistoryObserver for LoggingObserver {
    fn notify(&mut self, event: &HistoryEvent) {
        match event {
            HistoryEvent::Calculated { record } => info!(
                operation = %record.operation,
                operand1 = %record.operand1,
                operand2 = %record.operand2,
                result = %record.result,
                "calculation performed"
            ),
            HistoryEvent::Undone { record } => match record {
                Some(r) => info!(record = %r, "undo performed"),
                None => info!("undo performed"),
            },
            HistoryEvent::Redone { record } => match record {
                Some(r) => info!(record = %r, "redo performed"),
                None => info!("redo performed"),
            },
            HistoryEvent::Cleared { removed } => info!(removed, "history cleared"),
            HistoryEvent::Saved { count, path } => {
                info!(count, path = %path.display(), "history saved")
            }
            HistoryEvent::Loaded { count, path } => {
                info!(count, path = %path.display(), "history loaded")
            }
        }
    }
}
