//! Common utility functions for tax calculations.
//!
//! This module provides the rounding, input coercion and guarded division
//! helpers shared by the evaluator, the projector and the tool calculators.

use rust_decimal::Decimal;
use tracing::warn;

/// Denominators smaller than this in magnitude are treated as zero.
const RATIO_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fiscal_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fiscal_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Clamps negative values to zero.
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// The representable extreme on the side of `positive`.
fn saturated(positive: bool) -> Decimal {
    if positive { Decimal::MAX } else { Decimal::MIN }
}

/// `a + b`, clamped to [`Decimal::MAX`] / [`Decimal::MIN`] instead of
/// panicking when the sum does not fit.
pub fn saturating_add(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    a.checked_add(b).unwrap_or_else(|| {
        warn!(%a, %b, "addition overflowed, saturating");
        saturated(a.is_sign_positive())
    })
}

/// `a - b`, clamped like [`saturating_add`].
pub fn saturating_sub(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    a.checked_sub(b).unwrap_or_else(|| {
        warn!(%a, %b, "subtraction overflowed, saturating");
        saturated(a.is_sign_positive())
    })
}

/// `a × b`, clamped like [`saturating_add`].
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use fiscal_core::calculations::common::saturating_mul;
///
/// assert_eq!(saturating_mul(dec!(1.5), dec!(4)), dec!(6.0));
/// assert_eq!(saturating_mul(Decimal::MAX, dec!(-2)), Decimal::MIN);
/// ```
pub fn saturating_mul(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    a.checked_mul(b).unwrap_or_else(|| {
        warn!(%a, %b, "multiplication overflowed, saturating");
        saturated(a.is_sign_positive() == b.is_sign_positive())
    })
}

/// Sum of `values` through [`saturating_add`].
pub fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().fold(Decimal::ZERO, saturating_add)
}

/// Strips currency symbols, whitespace, underscores and comma thousands
/// separators.
fn normalize_amount_input(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '€' | '£' | '$' | ',' | '_') && !c.is_whitespace())
        .collect()
}

/// Parses user input into a [`Decimal`], falling back to zero.
///
/// Blank input is zero. Input that still fails to parse after normalization
/// is also zero, and a warning is logged. Sign is preserved so growth rates
/// can be negative; use [`non_negative`] for amounts.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fiscal_core::calculations::common::coerce_amount;
///
/// assert_eq!(coerce_amount("€ 150,000"), dec!(150000));
/// assert_eq!(coerce_amount("-2.5"), dec!(-2.5));
/// assert_eq!(coerce_amount(""), dec!(0));
/// assert_eq!(coerce_amount("abc"), dec!(0));
/// ```
pub fn coerce_amount(s: &str) -> Decimal {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Decimal::ZERO;
    }
    normalized
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&normalized))
        .unwrap_or_else(|e| {
            warn!(input = %s, "invalid amount, using 0: {}", e);
            Decimal::ZERO
        })
}

/// Divides `numerator` by `denominator`, returning zero when the denominator
/// is zero or close enough to it to blow up the result.
pub fn safe_ratio(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator.abs() < RATIO_EPSILON {
        if !numerator.is_zero() {
            warn!(%numerator, %denominator, "ratio denominator is zero, using 0");
        }
        return Decimal::ZERO;
    }
    numerator
        .checked_div(denominator)
        .unwrap_or_else(|| {
            warn!(%numerator, %denominator, "ratio overflowed, using 0");
            Decimal::ZERO
        })
}

/// [`safe_ratio`] expressed as a percentage.
pub fn ratio_pct(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    safe_ratio(numerator, denominator)
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

/// Converts a percentage such as `26` into the fraction `0.26`.
pub fn pct_to_rate(pct: Decimal) -> Decimal {
    pct / Decimal::ONE_HUNDRED
}
