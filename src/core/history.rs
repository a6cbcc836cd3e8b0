use std::collections::VecDeque;

use super::HistoryError;
use crate::record::CalculationRecord;

/// Owned, independent copy of a [`HistoryLog`]'s records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    records: Vec<CalculationRecord>,
}

impl Snapshot {
    /// Snapshot holding `records` in chronological order.
    pub fn new(records: Vec<CalculationRecord>) -> Self {
        Self { records }
    }

    /// Records in chronological order.
    pub fn records(&self) -> &[CalculationRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consumes the snapshot, yielding its records.
    pub fn into_records(self) -> Vec<CalculationRecord> {
        self.records
    }
}

/// Bounded, chronologically ordered calculation history.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    records: VecDeque<CalculationRecord>,
    max_size: usize,
}

impl HistoryLog {
    /// Empty log holding at most `max_size` records (at least one).
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::new(),
            max_size: max_size.max(1),
        }
    }

    /// Capacity bound.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CalculationRecord> + ExactSizeIterator {
        self.records.iter()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&CalculationRecord> {
        self.records.back()
    }

    /// Records as an owned vector, oldest first.
    pub fn to_vec(&self) -> Vec<CalculationRecord> {
        self.records.iter().cloned().collect()
    }

    /// Appends `record`, evicting the oldest entries past the bound.
    ///
    /// Returns the evicted records, oldest first.
    pub fn append(&mut self, record: CalculationRecord) -> Vec<CalculationRecord> {
        self.records.push_back(record);
        let overflow = self.records.len().saturating_sub(self.max_size);
        self.records.drain(..overflow).collect()
    }

    /// Deep copy of the current contents.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.to_vec())
    }

    /// Replaces the contents wholesale with the snapshot's records.
    ///
    /// A snapshot larger than the bound is rejected and the log is left as
    /// it was.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), HistoryError> {
        if snapshot.len() > self.max_size {
            return Err(HistoryError::SnapshotExceedsCapacity {
                len: snapshot.len(),
                max: self.max_size,
            });
        }
        self.records = snapshot.records().iter().cloned().collect();
        Ok(())
    }

    /// Empties the log. Returns `false` when it was already empty.
    pub fn clear(&mut self) -> bool {
        if self.records.is_empty() {
            return false;
        }
        self.records.clear();
        true
    }
}
