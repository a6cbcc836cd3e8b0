//! Fixed-precision calculation engine.
//!
//! [`CalculationEngine::calculate`] runs, in order: bounds check, operator
//! precondition ([`validate`]), operand quantization, [`execute`], result
//! quantization. It never logs; every failure is a typed [`CalcError`].

mod power;

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use thiserror::Error;

use crate::{
    config::CalculatorConfig,
    decimal::Decimal,
    record::{Calculation, Value},
    types::Operator,
};

/// Operand rejected before any arithmetic ran.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `|operand|` exceeds the configured maximum input.
    #[error("inputs must be within ±{limit}")]
    OutOfRange {
        /// Configured maximum magnitude.
        limit: Decimal,
    },
    /// Divisor of a division-like operator is zero.
    #[error("cannot divide by zero")]
    DivisionByZero,
    /// Root of a negative number.
    #[error("radicand cannot be negative")]
    NegativeRadicand,
    /// Root of degree zero.
    #[error("degree of root cannot be zero")]
    ZeroRootDegree,
    /// Operand could not be expressed at the configured precision.
    #[error("operand cannot be rounded to the configured precision")]
    RoundingFailed,
}

/// Arithmetic that could not be completed or formatted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// Result does not fit the configured precision.
    #[error("result cannot be formatted at the configured precision")]
    ResultFormattingFailed,
    /// Divisor became zero once rounded to the configured precision.
    #[error("divisor rounds to zero at the configured precision")]
    DivisionByZero,
    /// `0 ^ b` with `b <= 0`.
    #[error("zero cannot be raised to a non-positive power")]
    ZeroToNonPositivePower,
    /// Negative base with a fractional exponent.
    #[error("result is not a real number")]
    ComplexResult,
}

/// Any failure of [`CalculationEngine::calculate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// Bad operand; state is unchanged and the caller may re-prompt.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Arithmetic failure; no record is produced.
    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Rounding context shared by quantization and exponentiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    /// Digits kept after the decimal point.
    pub fractional_digits: u32,
    /// Maximum significant digits of any quantized value.
    pub significant_digits: u32,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            fractional_digits: 4,
            significant_digits: 28,
        }
    }
}

/// Exact result of [`execute`], before result quantization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exact {
    /// Rational value still to be quantized.
    Rational(BigRational),
    /// Integer value, reported as-is.
    Integer(BigInt),
}

/// Operator-specific precondition on the raw operands.
pub fn validate(operator: Operator, a: &Decimal, b: &Decimal) -> Result<(), ValidationError> {
    match operator {
        Operator::Divide | Operator::IntegerDivide | Operator::Modulo | Operator::Percentage => {
            if b.is_zero() {
                return Err(ValidationError::DivisionByZero);
            }
        }
        Operator::Root => {
            if a.is_negative() {
                return Err(ValidationError::NegativeRadicand);
            }
            if b.is_zero() {
                return Err(ValidationError::ZeroRootDegree);
            }
        }
        Operator::Add
        | Operator::Subtract
        | Operator::Multiply
        | Operator::Power
        | Operator::AbsoluteDifference => {}
    }
    Ok(())
}

/// Applies `operator` to already-quantized operands.
pub fn execute(
    operator: Operator,
    a: &Decimal,
    b: &Decimal,
    precision: Precision,
) -> Result<Exact, OperationError> {
    let a = a.to_rational();
    let b = b.to_rational();
    let nonzero = |b: &BigRational| {
        if b.is_zero() {
            Err(OperationError::DivisionByZero)
        } else {
            Ok(())
        }
    };

    let value = match operator {
        Operator::Add => a + b,
        Operator::Subtract => a - b,
        Operator::Multiply => a * b,
        Operator::Divide => {
            nonzero(&b)?;
            a / b
        }
        Operator::IntegerDivide => {
            nonzero(&b)?;
            return Ok(Exact::Integer((a / b).floor().to_integer()));
        }
        Operator::Modulo => {
            nonzero(&b)?;
            let quotient = (&a / &b).trunc();
            a - b * quotient
        }
        Operator::Power => power::pow(&a, &b, precision)?,
        Operator::Root => {
            nonzero(&b)?;
            power::pow(&a, &b.recip(), precision)?
        }
        Operator::Percentage => {
            nonzero(&b)?;
            a / b * BigRational::from_integer(BigInt::from(100u32))
        }
        Operator::AbsoluteDifference => (a - b).abs(),
    };
    Ok(Exact::Rational(value))
}

/// Stateless calculator bound to one input limit and precision.
#[derive(Debug, Clone)]
pub struct CalculationEngine {
    max_input: Decimal,
    precision: Precision,
}

impl Default for CalculationEngine {
    fn default() -> Self {
        Self::new(Decimal::from(1000), Precision::default())
    }
}

impl CalculationEngine {
    /// Engine rejecting operands above `max_input` in magnitude.
    pub fn new(max_input: Decimal, precision: Precision) -> Self {
        Self { max_input, precision }
    }

    /// Engine configured from the calculator settings.
    pub fn from_config(config: &CalculatorConfig) -> Self {
        Self::new(config.max_input_value.clone(), config.precision())
    }

    /// Maximum accepted operand magnitude.
    pub fn max_input(&self) -> &Decimal {
        &self.max_input
    }

    /// Rounding context.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Validates, executes and rounds one operation.
    pub fn calculate(&self, operator: Operator, a: &Decimal, b: &Decimal) -> Result<Calculation, CalcError> {
        self.check_bounds(a, b)?;
        validate(operator, a, b)?;

        let operand1 = self.quantize_operand(a)?;
        let operand2 = self.quantize_operand(b)?;

        let result = match execute(operator, &operand1, &operand2, self.precision)? {
            Exact::Integer(i) => Value::Integer(i),
            Exact::Rational(r) => Value::Decimal(
                Decimal::quantize_rational(
                    &r,
                    self.precision.fractional_digits,
                    self.precision.significant_digits,
                )
                .ok_or(OperationError::ResultFormattingFailed)?,
            ),
        };

        Ok(Calculation {
            operator,
            operand1,
            operand2,
            result,
        })
    }

    fn check_bounds(&self, a: &Decimal, b: &Decimal) -> Result<(), ValidationError> {
        let exceeds = |v: &Decimal| v.abs().cmp_value(&self.max_input) == Ordering::Greater;
        if exceeds(a) || exceeds(b) {
            return Err(ValidationError::OutOfRange {
                limit: self.max_input.clone(),
            });
        }
        Ok(())
    }

    fn quantize_operand(&self, v: &Decimal) -> Result<Decimal, ValidationError> {
        v.quantize(self.precision.fractional_digits, self.precision.significant_digits)
            .ok_or(ValidationError::RoundingFailed)
    }
}
