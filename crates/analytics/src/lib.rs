//! `salesboard-analytics`
//!
//! **Responsibility:** the ledger analytics engine.
//!
//! - ABC (Pareto) classification of one ledger dimension.
//! - Monthly sales forecast with tiered safety margins.
//! - Product catalog helpers for forecast scoping.
//!
//! Everything here is a pure function of an immutable row slice: no IO, no shared
//! mutable state, identical input gives identical output.

pub mod abc;
pub mod catalog;
pub mod forecast;
pub mod job;

pub use abc::{
    classify, classify_by_name, summarize, AbcClass, AbcClassifier, AbcSummary, AbcThresholds,
    ClassSummary, DimensionGroup,
};
pub use catalog::{product_labels, search_products};
pub use forecast::{
    forecast, ForecastResult, Forecaster, MonthBucket, SafetyMargins, SafetyMultipliers,
};
pub use job::{AnalyticsJob, ForecastJob};

use rust_decimal::Decimal;
use salesboard_core::{AnalyticsError, AnalyticsResult};

/// `100 * part / whole`, or zero when `whole` is zero.
///
/// Fails with `Overflow` instead of panicking when the quotient leaves the decimal range.
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> AnalyticsResult<Decimal> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    // Multiply first to keep exact results (800/1000 -> 80).
    let percent = match part.checked_mul(Decimal::ONE_HUNDRED) {
        Some(scaled) => scaled.checked_div(whole),
        None => part
            .checked_div(whole)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED)),
    };
    percent.ok_or_else(|| AnalyticsError::overflow(format!("{part} as a percentage of {whole}")))
}

/// Checked sum; `what` names the aggregate in the error.
pub(crate) fn checked_sum(
    values: impl IntoIterator<Item = Decimal>,
    what: &str,
) -> AnalyticsResult<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v)
            .ok_or_else(|| AnalyticsError::overflow(format!("{what} exceeds the decimal range")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percent_is_exact_for_simple_ratios() {
        assert_eq!(percent_of(dec!(800), dec!(1000)).unwrap(), dec!(80));
        assert_eq!(percent_of(dec!(5), Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn percent_overflow_is_an_error() {
        let err = percent_of(dec!(10000000000000000000000000), dec!(0.01)).unwrap_err();
        assert!(matches!(err, AnalyticsError::Overflow(_)));
    }

    #[test]
    fn sum_overflow_is_an_error() {
        assert!(matches!(
            checked_sum([Decimal::MAX, Decimal::ONE], "total"),
            Err(AnalyticsError::Overflow(_))
        ));
        assert_eq!(checked_sum([dec!(1.5), dec!(-0.5)], "total").unwrap(), dec!(1));
    }
}
