//! Calculator session: the single writer of history, stacks and file.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    config::{CalculatorConfig, ConfigError},
    core::{
        HistoryError,
        caretaker::UndoRedo,
        history::{HistoryLog, Snapshot},
    },
    decimal::Decimal,
    engine::{CalcError, CalculationEngine},
    persist::{HistorySink, PersistError, SaveOutcome, csv::CsvHistoryFile, json},
    record::CalculationRecord,
    types::{InstanceId, Operator},
};

use super::events::{HistoryEvent, HistoryObserver, LoggingObserver};

/// Any failure of a session command.
#[derive(Debug, Error)]
pub enum CalculatorError {
    /// Engine rejected the operands or the arithmetic.
    #[error(transparent)]
    Calc(#[from] CalcError),
    /// History subsystem refused the command.
    #[error(transparent)]
    History(#[from] HistoryError),
    /// History file could not be read or written.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// Settings were unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result of a successful calculation.
#[derive(Debug)]
pub struct CalculationOutcome {
    /// Record appended to history.
    pub record: CalculationRecord,
    /// Oldest records pushed out by the history bound.
    pub evicted: Vec<CalculationRecord>,
    /// Autosave failure, if any. The record stays in history regardless.
    pub autosave_error: Option<PersistError>,
}

/// One interactive session over a bounded, undoable, persisted history.
pub struct Calculator {
    engine: CalculationEngine,
    log: HistoryLog,
    caretaker: UndoRedo,
    sink: Box<dyn HistorySink>,
    observers: Vec<Box<dyn HistoryObserver>>,
    instance_id: InstanceId,
}

impl Calculator {
    /// Session over `sink`, with a fresh instance id and the logging observer attached.
    pub fn new(config: &CalculatorConfig, sink: Box<dyn HistorySink>) -> Self {
        Self {
            engine: CalculationEngine::from_config(config),
            log: HistoryLog::new(config.max_history_size),
            caretaker: UndoRedo::with_depth(config.max_undo_depth),
            sink,
            observers: vec![Box::new(LoggingObserver)],
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Session backed by the row-format file named in `config`.
    pub fn open(config: &CalculatorConfig) -> Result<Self, CalculatorError> {
        config.validate()?;
        let sink = CsvHistoryFile::open(config.history_path(), config.max_history_size, config.auto_save)?;
        Ok(Self::new(config, Box::new(sink)))
    }

    /// Replaces the generated instance id.
    pub fn with_instance_id(mut self, instance_id: impl Into<InstanceId>) -> Self {
        self.instance_id = instance_id.into();
        self
    }

    /// Attaches another observer.
    pub fn subscribe(&mut self, observer: Box<dyn HistoryObserver>) {
        self.observers.push(observer);
    }

    /// Session identifier stamped on every record.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Engine in use.
    pub fn engine(&self) -> &CalculationEngine {
        &self.engine
    }

    /// Live history.
    pub fn history(&self) -> &HistoryLog {
        &self.log
    }

    /// Persistence target.
    pub fn sink(&self) -> &dyn HistorySink {
        self.sink.as_ref()
    }

    /// True when an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.caretaker.can_undo()
    }

    /// True when a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.caretaker.can_redo()
    }

    /// Runs one operation and appends it to history.
    ///
    /// The pre-append state is snapshotted first, so the append can be
    /// undone. Autosave runs afterwards; its failure is reported in the
    /// outcome without rolling the append back.
    pub fn calculate(
        &mut self,
        operator: Operator,
        a: &Decimal,
        b: &Decimal,
    ) -> Result<CalculationOutcome, CalculatorError> {
        let calculation = self.engine.calculate(operator, a, b)?;
        let record = CalculationRecord::stamp_now(calculation, self.instance_id.clone());

        self.caretaker.record_before_mutation(&self.log);
        let evicted = self.log.append(record.clone());
        if !evicted.is_empty() {
            debug!(evicted = evicted.len(), max = self.log.max_size(), "history bound reached");
        }
        self.emit(HistoryEvent::Calculated {
            record: record.clone(),
        });

        let autosave_error = self.sink.append_row(&record).err();
        if let Some(err) = &autosave_error {
            warn!(error = %err, "autosave failed");
        }

        Ok(CalculationOutcome {
            record,
            evicted,
            autosave_error,
        })
    }

    /// Steps history back once. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<Option<CalculationRecord>, CalculatorError> {
        if !self.caretaker.can_undo() {
            warn!("nothing to undo");
            return Ok(None);
        }
        let record = self.caretaker.undo(&mut self.log)?;
        self.emit(HistoryEvent::Undone {
            record: record.clone(),
        });
        Ok(record)
    }

    /// Re-applies the last undone step. `Ok(None)` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<Option<CalculationRecord>, CalculatorError> {
        if !self.caretaker.can_redo() {
            warn!("nothing to redo");
            return Ok(None);
        }
        let record = self.caretaker.redo(&mut self.log)?;
        self.emit(HistoryEvent::Redone {
            record: record.clone(),
        });
        Ok(record)
    }

    /// Empties the in-memory history (undoable). `false` when already empty.
    pub fn clear(&mut self) -> bool {
        if self.log.is_empty() {
            warn!("no history to clear");
            return false;
        }
        let removed = self.log.len();
        self.caretaker.record_before_mutation(&self.log);
        self.log.clear();
        self.emit(HistoryEvent::Cleared { removed });
        true
    }

    /// Overwrites the history file with the current bounded history.
    pub fn save(&mut self) -> Result<SaveOutcome, CalculatorError> {
        let outcome = self.sink.save(&self.log.to_vec())?;
        if let SaveOutcome::Saved(count) = outcome {
            let path = self.sink.path().to_path_buf();
            self.emit(HistoryEvent::Saved { count, path });
        }
        Ok(outcome)
    }

    /// Initializes an empty history from the history file.
    ///
    /// Returns the number of records loaded.
    pub fn load(&mut self) -> Result<usize, CalculatorError> {
        if !self.log.is_empty() {
            return Err(HistoryError::WouldOverrideExisting.into());
        }
        let records = self.sink.load()?;
        let path = self.sink.path().to_path_buf();
        self.install_loaded(records, &path)
    }

    /// Writes the current history as a JSON envelope to `path`.
    pub fn export_json(&mut self, path: &Path) -> Result<usize, CalculatorError> {
        let count = json::export(path, &self.log.to_vec())?;
        self.emit(HistoryEvent::Saved {
            count,
            path: path.to_path_buf(),
        });
        Ok(count)
    }

    /// Initializes an empty history from a JSON envelope at `path`.
    pub fn import_json(&mut self, path: &Path) -> Result<usize, CalculatorError> {
        if !self.log.is_empty() {
            return Err(HistoryError::WouldOverrideExisting.into());
        }
        let records = json::import(path)?;
        self.install_loaded(records, path)
    }

    fn install_loaded(&mut self, mut records: Vec<CalculationRecord>, path: &Path) -> Result<usize, CalculatorError> {
        if records.is_empty() {
            warn!(path = %path.display(), "no saved history to load");
            return Ok(0);
        }
        let overflow = records.len().saturating_sub(self.log.max_size());
        if overflow > 0 {
            warn!(dropped = overflow, max = self.log.max_size(), "loaded history exceeds bound; keeping newest");
            records.drain(..overflow);
        }

        let snapshot = Snapshot::new(records);
        let count = snapshot.len();
        self.caretaker.record_before_mutation(&self.log);
        self.log.restore(&snapshot)?;
        self.emit(HistoryEvent::Loaded {
            count,
            path: path.to_path_buf(),
        });
        Ok(count)
    }

    fn emit(&mut self, event: HistoryEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }
}
