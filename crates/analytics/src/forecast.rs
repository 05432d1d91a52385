use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use salesboard_core::{AnalyticsError, AnalyticsResult, LedgerRow, MonthKey};

/// Multipliers applied to the monthly average to derive the safety tiers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyMultipliers {
    low: Decimal,
    medium: Decimal,
    critical: Decimal,
}

impl SafetyMultipliers {
    pub fn new(low: Decimal, medium: Decimal, critical: Decimal) -> AnalyticsResult<Self> {
        if low < Decimal::ZERO || low > medium || medium > critical {
            return Err(AnalyticsError::validation(format!(
                "multipliers must satisfy 0 <= low ({low}) <= medium ({medium}) <= critical ({critical})"
            )));
        }
        Ok(Self { low, medium, critical })
    }

    pub fn low(&self) -> Decimal {
        self.low
    }

    pub fn medium(&self) -> Decimal {
        self.medium
    }

    pub fn critical(&self) -> Decimal {
        self.critical
    }

    fn apply(&self, average: Decimal) -> SafetyMargins {
        SafetyMargins {
            low: average * self.low,
            medium: average * self.medium,
            critical: average * self.critical,
        }
    }
}

impl Default for SafetyMultipliers {
    /// 110% / 130% / 150% of the monthly average.
    fn default() -> Self {
        Self {
            low: Decimal::new(110, 2),
            medium: Decimal::new(130, 2),
            critical: Decimal::new(150, 2),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyMargins {
    pub low: Decimal,
    pub medium: Decimal,
    pub critical: Decimal,
}

/// Sales total of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub month_key: MonthKey,
    pub sales_total: Decimal,
}

/// Monthly sales history plus restock recommendations.
///
/// `monthly_data` is chronological, so exporters can stream it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub monthly_data: Vec<MonthBucket>,
    pub average_total: Decimal,
    pub max_sales: Decimal,
    pub min_sales: Decimal,
    /// Tracks the medium safety tier.
    pub recommendation: Decimal,
    pub safety_margins: SafetyMargins,
}

impl ForecastResult {
    /// Forecast over no observed sales: every statistic is zero.
    pub fn empty() -> Self {
        Self {
            monthly_data: Vec::new(),
            average_total: Decimal::ZERO,
            max_sales: Decimal::ZERO,
            min_sales: Decimal::ZERO,
            recommendation: Decimal::ZERO,
            safety_margins: SafetyMargins {
                low: Decimal::ZERO,
                medium: Decimal::ZERO,
                critical: Decimal::ZERO,
            },
        }
    }

    pub fn has_data(&self) -> bool {
        !self.monthly_data.is_empty()
    }
}

/// Monthly-bucket forecaster.
///
/// The margins are plain multiplicative projections of the monthly average; there is
/// no variance or lead-time modelling.
#[derive(Debug, Copy, Clone, Default)]
pub struct Forecaster {
    multipliers: SafetyMultipliers,
    require_match: bool,
}

impl Forecaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_multipliers(mut self, multipliers: SafetyMultipliers) -> Self {
        self.multipliers = multipliers;
        self
    }

    /// Fail with `EmptyProductScope` when a named product matches no rows.
    pub fn require_match(mut self, require: bool) -> Self {
        self.require_match = require;
        self
    }

    pub fn multipliers(&self) -> SafetyMultipliers {
        self.multipliers
    }

    /// Forecast for `product_filter`, or for every product when it is empty.
    pub fn forecast(&self, rows: &[LedgerRow], product_filter: &str) -> AnalyticsResult<ForecastResult> {
        let result = self.compute(rows, product_filter);

        if self.require_match && is_named(product_filter) && !result.has_data() {
            return Err(AnalyticsError::empty_product_scope(product_filter));
        }

        Ok(result)
    }

    fn compute(&self, rows: &[LedgerRow], product_filter: &str) -> ForecastResult {
        let named = is_named(product_filter);

        let mut buckets: BTreeMap<MonthKey, Decimal> = BTreeMap::new();
        for row in rows {
            if named && row.product() != product_filter {
                continue;
            }
            *buckets.entry(row.month()).or_insert(Decimal::ZERO) += row.line_amount();
        }

        if buckets.is_empty() {
            return ForecastResult::empty();
        }

        let totals = || buckets.values().copied();
        let sum: Decimal = totals().sum();
        let average_total = sum / Decimal::from(buckets.len());
        let max_sales = totals().max().unwrap_or(Decimal::ZERO);
        let min_sales = totals().min().unwrap_or(Decimal::ZERO);
        let safety_margins = self.multipliers.apply(average_total);

        ForecastResult {
            monthly_data: buckets
                .iter()
                .map(|(month_key, sales_total)| MonthBucket {
                    month_key: *month_key,
                    sales_total: *sales_total,
                })
                .collect(),
            average_total,
            max_sales,
            min_sales,
            recommendation: safety_margins.medium,
            safety_margins,
        }
    }
}

/// Only the empty string means "all products"; callers normalize user input.
fn is_named(product_filter: &str) -> bool {
    !product_filter.is_empty()
}

/// Forecast with the default 1.10 / 1.30 / 1.50 multipliers.
///
/// An unmatched product yields a zeroed result, never an error.
pub fn forecast(rows: &[LedgerRow], product_filter: &str) -> ForecastResult {
    Forecaster::new().compute(rows, product_filter)
}
