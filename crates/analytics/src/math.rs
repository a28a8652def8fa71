//! Division and dispersion helpers.
//!
//! Every metric that could divide by zero goes through [`safe_divide`] or
//! [`safe_ratio`], so the fallback policy lives in one place.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Divides `numerator` by `denominator`, returning `fallback` when the
/// denominator is zero or the quotient overflows.
pub fn safe_divide(numerator: Decimal, denominator: Decimal, fallback: Decimal) -> Decimal {
    safe_ratio(numerator, denominator).unwrap_or(fallback)
}

/// Like [`safe_divide`] but reports the undefined case as `None`.
pub fn safe_ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator.checked_div(denominator)
}

/// Sum of `values`, or `None` if it leaves the `Decimal` range.
pub fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// Sum of `values`, clamped at the `Decimal` bounds.
pub fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

/// Arithmetic mean. `None` for an empty slice or when the sum overflows.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    let sum = checked_sum(values.iter().copied())?;
    safe_ratio(sum, Decimal::from(values.len()))
}

/// Population standard deviation (divides by `n`, not `n - 1`).
///
/// `None` for an empty slice or when an intermediate value overflows.
pub fn population_std_dev(values: &[Decimal]) -> Option<Decimal> {
    let mean = mean(values)?;
    let squared = values.iter().try_fold(Decimal::ZERO, |acc, v| {
        let deviation = v.checked_sub(mean)?;
        acc.checked_add(deviation.checked_mul(deviation)?)
    })?;
    let variance = safe_ratio(squared, Decimal::from(values.len()))?;
    variance.sqrt()
}

/// `part / whole * 100`, or zero when `whole` is zero or the result overflows.
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    safe_ratio(part, whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}
