//! Calculation results and the immutable history record.

use std::fmt;

use chrono::{Local, NaiveDateTime, Timelike};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::{
    decimal::{Decimal, DecimalParseError},
    types::{InstanceId, Operator},
};

/// Timestamp layout used in the history file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of one calculation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Fixed-precision decimal result.
    Decimal(Decimal),
    /// Whole-number result (integer division).
    Integer(#[serde(with = "bigint_text")] BigInt),
}

impl Value {
    /// Parses result text the way `operator` would have produced it.
    pub fn parse_for(operator: Operator, text: &str) -> Result<Self, DecimalParseError> {
        if operator.yields_integer() {
            let trimmed = text.trim();
            return BigInt::parse_bytes(trimmed.as_bytes(), 10)
                .map(Value::Integer)
                .ok_or_else(|| DecimalParseError::Invalid(trimmed.to_string()));
        }
        text.parse().map(Value::Decimal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Decimal(d) => fmt::Display::fmt(d, f),
            Value::Integer(i) => fmt::Display::fmt(i, f),
        }
    }
}

/// Log-worthy output of the engine: operator, quantized operands and result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculation {
    /// Operator applied.
    pub operator: Operator,
    /// First operand after quantization.
    pub operand1: Decimal,
    /// Second operand after quantization.
    pub operand2: Decimal,
    /// Quantized result.
    pub result: Value,
}

/// One completed calculation as kept in history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalculationRecord {
    /// Local wall-clock time, second resolution.
    pub timestamp: NaiveDateTime,
    /// Operator applied.
    pub operation: Operator,
    /// First operand.
    pub operand1: Decimal,
    /// Second operand.
    pub operand2: Decimal,
    /// Result.
    pub result: Value,
    /// Session that produced the record.
    pub instance_id: InstanceId,
}

impl CalculationRecord {
    /// Wraps an engine result with a timestamp and session id.
    pub fn new(calc: Calculation, timestamp: NaiveDateTime, instance_id: impl Into<InstanceId>) -> Self {
        Self {
            timestamp,
            operation: calc.operator,
            operand1: calc.operand1,
            operand2: calc.operand2,
            result: calc.result,
            instance_id: instance_id.into(),
        }
    }

    /// Wraps an engine result stamped with the current local time.
    pub fn stamp_now(calc: Calculation, instance_id: impl Into<InstanceId>) -> Self {
        Self::new(calc, now_to_second(), instance_id)
    }

    /// Formatted timestamp as written to disk.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl fmt::Display for CalculationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {}: {} {} {} = {}",
            self.timestamp_text(),
            self.operation,
            self.operand1,
            self.operation.symbol(),
            self.operand2,
            self.result
        )
    }
}

/// Current local time truncated to whole seconds.
pub fn now_to_second() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

mod bigint_text {
    use num_bigint::BigInt;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let text = String::deserialize(deserializer)?;
        BigInt::parse_bytes(text.as_bytes(), 10)
            .ok_or_else(|| de::Error::custom(format!("invalid integer `{text}`")))
    }
}
