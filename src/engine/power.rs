//! Exponentiation for the Power and Root operators.
//!
//! Integer exponents are evaluated exactly on rationals. A fractional
//! exponent `p/q` is exact too whenever the base is a perfect `q`-th power,
//! which covers every rational result and so every exact rounding tie.
//! Only irrational results (and exact expansions that would be huge) go
//! through `exp(e * ln b)` on scaled integers carrying guard digits beyond
//! the significant-digit budget.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::{OperationError, Precision};
use crate::decimal::pow10;

/// Extra digits carried by the fixed-point series beyond what the result needs.
const GUARD_DIGITS: u32 = 12;
/// Digits absorbing truncation inside the series loops themselves.
const SERIES_EXTRA_DIGITS: u32 = 10;
/// Upper bound on `|n| * digits(base)` for the exact integer-power path.
const EXACT_DIGIT_BUDGET: u64 = 200_000;

const LOG10_2: f64 = std::f64::consts::LOG10_2;

/// Computes `base ^ exponent` closely enough to quantize at `precision`.
pub(crate) fn pow(
    base: &BigRational,
    exponent: &BigRational,
    precision: Precision,
) -> Result<BigRational, OperationError> {
    if base.is_zero() {
        return if exponent.is_positive() {
            Ok(BigRational::zero())
        } else {
            Err(OperationError::ZeroToNonPositivePower)
        };
    }

    let integral = exponent.is_integer();
    if base.is_negative() && !integral {
        return Err(OperationError::ComplexResult);
    }
    let negate = base.is_negative() && is_odd(exponent.numer());
    let magnitude = base.abs();

    if magnitude.is_one() {
        return Ok(signed(BigRational::one(), negate));
    }

    let log10 = ratio_to_f64(exponent) * log10_abs(&magnitude);
    let integer_digits = f64::from(precision.significant_digits.saturating_sub(precision.fractional_digits));
    if log10 >= integer_digits + 0.5 {
        return Err(OperationError::ResultFormattingFailed);
    }
    if log10 < -f64::from(precision.fractional_digits) - 2.0 {
        return Ok(BigRational::zero());
    }

    let exact = if integral {
        exact_integer_pow(&magnitude, exponent.numer())
    } else {
        exact_rational_root(&magnitude, exponent.denom())
            .and_then(|root| exact_integer_pow(&root, exponent.numer()))
    };
    if let Some(exact) = exact {
        return Ok(signed(exact, negate));
    }

    let exponent_digits = ratio_to_f64(exponent).abs().log10().max(0.0).ceil() as u32;
    let working = precision.significant_digits + precision.fractional_digits + GUARD_DIGITS + exponent_digits;
    Ok(signed(fixed_point_pow(&magnitude, exponent, working), negate))
}

fn signed(value: BigRational, negate: bool) -> BigRational {
    if negate { -value } else { value }
}

fn is_odd(n: &BigInt) -> bool {
    !(n % 2u32).is_zero()
}

fn exact_integer_pow(magnitude: &BigRational, n: &BigInt) -> Option<BigRational> {
    let steps = n.magnitude().to_u64()?;
    let width = (magnitude.numer().bits() + magnitude.denom().bits()) as f64 * LOG10_2;
    if (steps as f64) * width > EXACT_DIGIT_BUDGET as f64 {
        return None;
    }
    let steps = u32::try_from(steps).ok()?;
    let numer = magnitude.numer().pow(steps);
    let denom = magnitude.denom().pow(steps);
    let value = BigRational::new(numer, denom);
    Some(if n.is_negative() { value.recip() } else { value })
}

/// `magnitude^(1/q)` when numerator and denominator are both perfect `q`-th powers.
fn exact_rational_root(magnitude: &BigRational, q: &BigInt) -> Option<BigRational> {
    let q = q.to_u32()?;
    let numer = exact_nth_root(magnitude.numer(), q)?;
    let denom = exact_nth_root(magnitude.denom(), q)?;
    Some(BigRational::new(numer, denom))
}

fn exact_nth_root(n: &BigInt, q: u32) -> Option<BigInt> {
    let root = n.nth_root(q);
    // a root of 1 means n < 2^q; skip the power check, which could be huge
    if root.is_one() {
        return n.is_one().then_some(root);
    }
    (root.pow(q) == *n).then_some(root)
}

/// `exp(exponent * ln(magnitude))` carried at `working` decimal digits.
fn fixed_point_pow(magnitude: &BigRational, exponent: &BigRational, working: u32) -> BigRational {
    let digits = working + SERIES_EXTRA_DIGITS;
    let scale = pow10(digits);
    let ln = ln_fixed(magnitude, &scale);
    let z = ln * exponent.numer() / exponent.denom();
    BigRational::new(exp_fixed(&z, &scale), scale)
}

/// `ln(x) * scale` for `x > 0`.
fn ln_fixed(x: &BigRational, scale: &BigInt) -> BigInt {
    // x = m * 2^k with m in (1/2, 2)
    let k = x.numer().bits() as i64 - x.denom().bits() as i64;
    let two_k = BigRational::from_integer(BigInt::one() << k.unsigned_abs());
    let m = if k >= 0 { x / &two_k } else { x * &two_k };

    let one = BigRational::one();
    let t = (&m - &one) / (&m + &one);
    let ln_m = atanh_fixed(&t, scale) * 2u32;

    let third = BigRational::new(BigInt::one(), BigInt::from(3u32));
    let ln2 = atanh_fixed(&third, scale) * 2u32;

    ln_m + ln2 * k
}

/// `atanh(t) * scale` for `|t| < 1`, by the odd power series.
fn atanh_fixed(t: &BigRational, scale: &BigInt) -> BigInt {
    let t_fixed = t.numer() * scale / t.denom();
    let t_squared = &t_fixed * &t_fixed / scale;

    let mut power = t_fixed;
    let mut sum = BigInt::zero();
    let mut n: u32 = 1;
    loop {
        let term = &power / n;
        if term.is_zero() {
            break;
        }
        sum += term;
        power = power * &t_squared / scale;
        n += 2;
    }
    sum
}

/// `exp(z / scale) * scale`.
fn exp_fixed(z: &BigInt, scale: &BigInt) -> BigInt {
    if z.is_negative() {
        let positive = exp_fixed(&-z, scale);
        return scale * scale / positive;
    }

    // argument reduction: exp(z) = exp(z / 2^s)^(2^s)
    let whole = z / scale;
    let halvings = whole.bits() + 8;
    let reduced = z >> halvings;

    let mut sum = scale.clone();
    let mut term = scale.clone();
    let mut n: u32 = 1;
    loop {
        term = term * &reduced / scale / n;
        if term.is_zero() {
            break;
        }
        sum += &term;
        n += 1;
    }

    for _ in 0..halvings {
        sum = &sum * &sum / scale;
    }
    sum
}

fn ratio_to_f64(r: &BigRational) -> f64 {
    let sign = if r.is_negative() { -1.0 } else { 1.0 };
    sign * 10f64.powf(log10_abs(r))
}

fn log10_abs(r: &BigRational) -> f64 {
    log10_big(r.numer()) - log10_big(r.denom())
}

fn log10_big(n: &BigInt) -> f64 {
    let bits = n.bits();
    if bits <= 1000 {
        return n.abs().to_f64().map_or(f64::INFINITY, f64::log10);
    }
    let shift = bits - 64;
    let top = (n.abs() >> shift).to_f64().map_or(f64::INFINITY, f64::log10);
    top + shift as f64 * LOG10_2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    const FOUR: Precision = Precision {
        fractional_digits: 4,
        significant_digits: 28,
    };

    fn rounded(value: &BigRational) -> BigInt {
        crate::decimal::round_half_up(&(value * BigRational::from_integer(pow10(4))))
    }

    #[test]
    fn perfect_roots_round_to_exact_digits() {
        let four = rat(4, 1);
        let half = rat(1, 2);
        assert_eq!(rounded(&pow(&four, &half, FOUR).unwrap()), BigInt::from(20_000));

        let eight = rat(8, 1);
        let third = rat(1, 3);
        assert_eq!(rounded(&pow(&eight, &third, FOUR).unwrap()), BigInt::from(20_000));
    }

    #[test]
    fn irrational_power_matches_known_digits() {
        // 2^0.5 = 1.41421356...
        let two = rat(2, 1);
        let half = rat(1, 2);
        assert_eq!(rounded(&pow(&two, &half, FOUR).unwrap()), BigInt::from(14_142));
        // 10^-1.5 = 0.0316227766...
        let ten = rat(10, 1);
        let e = rat(-3, 2);
        assert_eq!(rounded(&pow(&ten, &e, FOUR).unwrap()), BigInt::from(316));
    }

    #[test]
    fn integer_power_is_exact_and_signed() {
        let base = rat(-3, 2);
        assert_eq!(pow(&base, &rat(3, 1), FOUR).unwrap(), rat(-27, 8));
        assert_eq!(pow(&base, &rat(-2, 1), FOUR).unwrap(), rat(4, 9));
    }

    #[test]
    fn perfect_power_bases_take_the_exact_path() {
        // (9/4)^(5/2) = 243/32 = 7.59375, an exact tie at four digits
        assert_eq!(pow(&rat(9, 4), &rat(5, 2), FOUR).unwrap(), rat(243, 32));
        assert_eq!(rounded(&rat(243, 32)), BigInt::from(75_938));
        assert_eq!(pow(&rat(81, 16), &rat(5, 4), FOUR).unwrap(), rat(243, 32));
        assert_eq!(pow(&rat(4, 1), &rat(-1, 2), FOUR).unwrap(), rat(1, 2));
    }

    #[test]
    fn roots_detect_non_perfect_powers() {
        assert_eq!(exact_nth_root(&BigInt::from(81), 4), Some(BigInt::from(3)));
        assert_eq!(exact_nth_root(&BigInt::from(80), 4), None);
        assert_eq!(exact_nth_root(&BigInt::from(2), 1_000_000), None);
        assert_eq!(exact_nth_root(&BigInt::one(), 1_000_000), Some(BigInt::one()));
        assert_eq!(exact_rational_root(&rat(1, 2), &BigInt::from(2)), None);
    }

    #[test]
    fn zero_and_negative_bases_fail_where_undefined() {
        let zero = BigRational::zero();
        assert_eq!(pow(&zero, &rat(-1, 1), FOUR), Err(OperationError::ZeroToNonPositivePower));
        assert_eq!(pow(&zero, &zero, FOUR), Err(OperationError::ZeroToNonPositivePower));
        assert_eq!(pow(&rat(-8, 1), &rat(1, 3), FOUR), Err(OperationError::ComplexResult));
    }

    #[test]
    fn magnitude_guard_rejects_overflow_and_flushes_underflow() {
        let thousand = rat(1000, 1);
        assert_eq!(
            pow(&thousand, &rat(1000, 1), FOUR),
            Err(OperationError::ResultFormattingFailed)
        );
        assert_eq!(pow(&thousand, &rat(-1000, 1), FOUR).unwrap(), BigRational::zero());
    }
}
