//! Exact fixed-point decimal values.
//!
//! A [`Decimal`] is a big-integer mantissa scaled by a power of ten. Text
//! produced by [`fmt::Display`] never uses scientific notation and keeps
//! trailing zeros, so `parse(display(x)) == x` for every value.

use std::{cmp::Ordering, fmt, str::FromStr};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Largest decimal exponent accepted when parsing `1e…` literals.
const MAX_PARSE_EXPONENT: i64 = 4096;

/// Fixed-point decimal: `mantissa * 10^-scale`.
///
/// Equality is representational: `5.0000` and `5` are different values
/// here. Use [`Decimal::cmp_value`] for numeric comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

/// Failure to read a decimal literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalParseError {
    /// Input was empty or whitespace.
    #[error("empty decimal literal")]
    Empty,
    /// Input was not of the form `[+-]digits[.digits][e[+-]digits]`.
    #[error("invalid decimal literal `{0}`")]
    Invalid(String),
    /// Exponent part too large to materialize.
    #[error("exponent out of range in `{0}`")]
    ExponentOutOfRange(String),
}

pub(crate) fn pow10(n: u32) -> BigInt {
    BigInt::from(10u32).pow(n)
}

/// Rounds to the nearest integer, ties away from zero.
pub(crate) fn round_half_up(value: &BigRational) -> BigInt {
    let half = BigRational::new(BigInt::one(), BigInt::from(2u32));
    let magnitude = (value.abs() + half).floor().to_integer();
    if value.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}

fn digit_count(n: &BigInt) -> u32 {
    if n.is_zero() {
        1
    } else {
        n.magnitude().to_str_radix(10).len() as u32
    }
}

impl Decimal {
    /// Builds `mantissa * 10^-scale`.
    pub fn new(mantissa: BigInt, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    /// Zero with scale 0.
    pub fn zero() -> Self {
        Self::new(BigInt::zero(), 0)
    }

    /// Integer value with scale 0.
    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self::new(value.into(), 0)
    }

    /// Unscaled digits.
    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    /// Number of fractional digits.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// True for any zero, whatever the scale.
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    /// True for values strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// Absolute value, same scale.
    pub fn abs(&self) -> Self {
        Self::new(self.mantissa.abs(), self.scale)
    }

    /// Count of significant digits in the mantissa.
    pub fn significant_digits(&self) -> u32 {
        digit_count(&self.mantissa)
    }

    /// Exact rational value.
    pub fn to_rational(&self) -> BigRational {
        BigRational::new(self.mantissa.clone(), pow10(self.scale))
    }

    /// Numeric ordering, ignoring scale.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        let common = self.scale.max(other.scale);
        let lhs = &self.mantissa * pow10(common - self.scale);
        let rhs = &other.mantissa * pow10(common - other.scale);
        lhs.cmp(&rhs)
    }

    /// Rounds an exact rational to `precision` fractional digits, half-up.
    ///
    /// Returns `None` when the rounded mantissa needs more than
    /// `max_digits` significant digits.
    pub fn quantize_rational(value: &BigRational, precision: u32, max_digits: u32) -> Option<Self> {
        let scaled = value * BigRational::from_integer(pow10(precision));
        let mantissa = round_half_up(&scaled);
        if digit_count(&mantissa) > max_digits {
            return None;
        }
        Some(Self::new(mantissa, precision))
    }

    /// Re-expresses `self` with exactly `precision` fractional digits.
    pub fn quantize(&self, precision: u32, max_digits: u32) -> Option<Self> {
        if self.scale <= precision {
            let mantissa = &self.mantissa * pow10(precision - self.scale);
            if digit_count(&mantissa) > max_digits {
                return None;
            }
            return Some(Self::new(mantissa, precision));
        }
        Self::quantize_rational(&self.to_rational(), precision, max_digits)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.magnitude().to_str_radix(10);
        let sign = if self.mantissa.is_negative() { "-" } else { "" };
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let padded = if digits.len() <= scale {
            format!("{}{digits}", "0".repeat(scale + 1 - digits.len()))
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

impl FromStr for Decimal {
    type Err = DecimalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(DecimalParseError::Empty);
        }
        let invalid = || DecimalParseError::Invalid(text.to_string());

        let (negative, unsigned) = match text.as_bytes()[0] {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let (body, exponent) = match unsigned.find(['e', 'E']) {
            Some(pos) => {
                let exp_text = &unsigned[pos + 1..];
                let exp: i64 = exp_text.parse().map_err(|_| invalid())?;
                if exp.unsigned_abs() > MAX_PARSE_EXPONENT.unsigned_abs() {
                    return Err(DecimalParseError::ExponentOutOfRange(text.to_string()));
                }
                (&unsigned[..pos], exp)
            }
            None => (unsigned, 0),
        };

        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }

        let joined = format!("{int_part}{frac_part}");
        let mut mantissa = BigInt::parse_bytes(joined.as_bytes(), 10).ok_or_else(invalid)?;
        if negative {
            mantissa = -mantissa;
        }

        let scale = frac_part.len() as i64 - exponent;
        if scale < 0 {
            mantissa *= pow10((-scale) as u32);
            return Ok(Self::new(mantissa, 0));
        }
        let scale = u32::try_from(scale).map_err(|_| DecimalParseError::ExponentOutOfRange(text.to_string()))?;
        Ok(Self::new(mantissa, scale))
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal")
    }

    #[test]
    fn display_keeps_trailing_zeros_and_sign() {
        assert_eq!(dec("5.0000").to_string(), "5.0000");
        assert_eq!(dec("-0.05").to_string(), "-0.05");
        assert_eq!(dec("0.0001").to_string(), "0.0001");
        assert_eq!(dec("12").to_string(), "12");
        assert_eq!(dec("+3.10").to_string(), "3.10");
    }

    #[test]
    fn parse_accepts_exponents_without_emitting_them() {
        assert_eq!(dec("1e3").to_string(), "1000");
        assert_eq!(dec("2.5E-2").to_string(), "0.025");
        assert_eq!(dec(".5").to_string(), "0.5");
        assert_eq!(dec("7.").to_string(), "7");
    }

    #[test]
    fn parse_rejects_non_finite_and_garbage() {
        for bad in ["nan", "inf", "-", ".", "1.2.3", "1e", "12a", "--1", "1e99999"] {
            assert!(bad.parse::<Decimal>().is_err(), "{bad} should not parse");
        }
        assert_eq!("  ".parse::<Decimal>(), Err(DecimalParseError::Empty));
    }

    #[test]
    fn quantize_rounds_half_away_from_zero() {
        assert_eq!(dec("2.00005").quantize(4, 28), Some(dec("2.0001")));
        assert_eq!(dec("2.00004").quantize(4, 28), Some(dec("2.0000")));
        assert_eq!(dec("-2.00005").quantize(4, 28), Some(dec("-2.0001")));
        assert_eq!(dec("3").quantize(4, 28), Some(dec("3.0000")));
    }

    #[test]
    fn quantize_fails_past_significant_digit_budget() {
        assert!(dec("123456").quantize(4, 10).is_some());
        assert!(dec("1234567").quantize(4, 10).is_none());
    }

    #[test]
    fn cmp_value_ignores_scale() {
        assert_eq!(dec("5").cmp_value(&dec("5.0000")), Ordering::Equal);
        assert_eq!(dec("-1.5").cmp_value(&dec("1")), Ordering::Less);
        assert_ne!(dec("5"), dec("5.0000"));
    }
}
