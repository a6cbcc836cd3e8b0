//! Shared primitive aliases and the closed operator set.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque session identifier, stable for the lifetime of one process.
pub type InstanceId = String;

/// Arithmetic operator accepted by the calculation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `a + b`.
    Add,
    /// `a - b`.
    Subtract,
    /// `a * b`.
    Multiply,
    /// `a / b`.
    Divide,
    /// `floor(a / b)` as an integer.
    IntegerDivide,
    /// Remainder carrying the sign of the dividend.
    Modulo,
    /// `a ^ b`.
    Power,
    /// `a ^ (1 / b)`.
    Root,
    /// `(a / b) * 100`.
    Percentage,
    /// `|a - b|`.
    AbsoluteDifference,
}

impl Operator {
    /// Every operator, in menu order.
    pub const ALL: [Operator; 10] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::IntegerDivide,
        Operator::Modulo,
        Operator::Power,
        Operator::Root,
        Operator::Percentage,
        Operator::AbsoluteDifference,
    ];

    /// Name written to the `operation` column of the history file.
    pub fn display_name(self) -> &'static str {
        match self {
            Operator::Add => "Addition",
            Operator::Subtract => "Subtraction",
            Operator::Multiply => "Multiplication",
            Operator::Divide => "Division",
            Operator::IntegerDivide => "Integer Division",
            Operator::Modulo => "Modulo",
            Operator::Power => "Power",
            Operator::Root => "Root",
            Operator::Percentage => "Percentage",
            Operator::AbsoluteDifference => "Absolute Difference",
        }
    }

    /// Inverse of [`Operator::display_name`].
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.display_name() == name)
    }

    /// Short command word used by the REPL.
    pub fn command_name(self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Subtract => "subtract",
            Operator::Multiply => "multiply",
            Operator::Divide => "divide",
            Operator::IntegerDivide => "intdiv",
            Operator::Modulo => "modulo",
            Operator::Power => "power",
            Operator::Root => "root",
            Operator::Percentage => "percent",
            Operator::AbsoluteDifference => "absdiff",
        }
    }

    /// Infix symbol for human-readable summaries.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::IntegerDivide => "//",
            Operator::Modulo => "%",
            Operator::Power => "^",
            Operator::Root => "root",
            Operator::Percentage => "% of",
            Operator::AbsoluteDifference => "|-|",
        }
    }

    /// True when the operator yields an integer rather than a decimal.
    pub fn yields_integer(self) -> bool {
        matches!(self, Operator::IntegerDivide)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
