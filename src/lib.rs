//! Fixed-precision calculator core with bounded, undoable, persisted history.
//!
//! # Examples
//!
//! Engine and history without any files:
//! ```
//! use calclog::{
//!     core::{caretaker::UndoRedo, history::HistoryLog},
//!     decimal::Decimal,
//!     engine::CalculationEngine,
//!     record::CalculationRecord,
//!     types::Operator,
//! };
//!
//! let engine = CalculationEngine::default();
//! let a: Decimal = "2".parse().unwrap();
//! let b: Decimal = "3".parse().unwrap();
//! let calc = engine.calculate(Operator::Add, &a, &b).unwrap();
//! assert_eq!(calc.result.to_string(), "5.0000");
//!
//! let mut log = HistoryLog::new(100);
//! let mut stacks = UndoRedo::new();
//! stacks.record_before_mutation(&log);
//! log.append(CalculationRecord::stamp_now(calc, "doc"));
//!
//! stacks.undo(&mut log).unwrap();
//! assert!(log.is_empty());
//! ```
//!
//! A file-backed session:
//! ```no_run
//! use calclog::{config::CalculatorConfig, runtime::session::Calculator, types::Operator};
//!
//! let config = CalculatorConfig::default();
//! let mut calc = Calculator::open(&config).expect("open history");
//! let outcome = calc
//!     .calculate(Operator::Power, &"2".parse().unwrap(), &"0.5".parse().unwrap())
//!     .expect("calculate");
//! println!("{}", outcome.record);
//! calc.save().expect("save");
//! ```
#![deny(missing_docs)]

/// Settings and environment loading.
pub mod config;
/// History log, snapshots and undo/redo stacks.
pub mod core;
/// Exact fixed-point decimal values.
pub mod decimal;
/// Calculation engine and its error taxonomy.
pub mod engine;
/// History file gateway and JSON export.
pub mod persist;
/// Calculation records and result values.
pub mod record;
/// Interactive command loop.
pub mod repl;
/// Single-writer session facade and events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
