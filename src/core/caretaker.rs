use std::collections::VecDeque;

use hashbrown::HashMap;

use super::{
    HistoryError,
    history::{HistoryLog, Snapshot},
};
use crate::record::CalculationRecord;

/// Undo steps kept when no depth is configured.
pub const DEFAULT_UNDO_DEPTH: usize = 100;

/// Undo and redo stacks of [`Snapshot`]s mediating every history mutation.
///
/// The undo stack holds at most `max_depth` snapshots; the oldest is
/// dropped first. Undo plus redo never exceeds that depth, since undo and
/// redo only move snapshots between the two stacks.
#[derive(Debug)]
pub struct UndoRedo {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    max_depth: usize,
}

impl Default for UndoRedo {
    fn default() -> Self {
        Self::with_depth(DEFAULT_UNDO_DEPTH)
    }
}

impl UndoRedo {
    /// Empty stacks holding [`DEFAULT_UNDO_DEPTH`] undo steps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty stacks holding at most `max_depth` undo steps (minimum one).
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Configured undo depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Pushes the pre-mutation state and invalidates all redo branches.
    ///
    /// Callers must invoke this right before mutating `log`. At capacity
    /// the oldest undo step is forgotten.
    pub fn record_before_mutation(&mut self, log: &HistoryLog) {
        if self.undo.len() == self.max_depth {
            self.undo.pop_front();
        }
        self.undo.push_back(log.snapshot());
        self.redo.clear();
    }

    /// Steps back one mutation.
    ///
    /// Returns the record that disappeared, or `Ok(None)` when there is
    /// nothing to undo or the step removed nothing. On error both the log
    /// and the stacks are left as they were.
    pub fn undo(&mut self, log: &mut HistoryLog) -> Result<Option<CalculationRecord>, HistoryError> {
        let Some(target) = self.undo.pop_back() else {
            return Ok(None);
        };
        let current = log.snapshot();
        if let Err(err) = log.restore(&target) {
            self.undo.push_back(target);
            return Err(err);
        }
        let removed = last_missing(current.records(), target.records());
        self.redo.push(current);
        Ok(removed)
    }

    /// Re-applies the most recently undone mutation.
    ///
    /// Returns the record that reappeared; symmetric to [`UndoRedo::undo`].
    pub fn redo(&mut self, log: &mut HistoryLog) -> Result<Option<CalculationRecord>, HistoryError> {
        let Some(target) = self.redo.pop() else {
            return Ok(None);
        };
        let current = log.snapshot();
        if let Err(err) = log.restore(&target) {
            self.redo.push(target);
            return Err(err);
        }
        let restored = last_missing(target.records(), current.records());
        self.undo.push_back(current);
        Ok(restored)
    }

    /// True when an undo step is available.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// True when a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Depth of the undo stack.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Depth of the redo stack.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}

/// Chronologically last record of `from` with no counterpart in `against`.
///
/// Counts multiplicities, so duplicate records are matched one-for-one.
fn last_missing(from: &[CalculationRecord], against: &[CalculationRecord]) -> Option<CalculationRecord> {
    let mut remaining: HashMap<&CalculationRecord, usize> = HashMap::new();
    for rec in against {
        *remaining.entry(rec).or_default() += 1;
    }
    for rec in from.iter().rev() {
        match remaining.get_mut(rec) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return Some(rec.clone()),
        }
    }
    None
}
