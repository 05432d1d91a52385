use salesboard_core::{AnalyticsResult, LedgerRow};

use crate::abc::{AbcClassifier, DimensionGroup};
use crate::forecast::{ForecastResult, Forecaster};

/// A unit of analytics work over an immutable row snapshot.
///
/// Jobs never mutate their input and never perform IO; the snapshot is provided by the
/// caller (infra/API), which is also responsible for logging and error mapping.
pub trait AnalyticsJob: Send + Sync {
    type Output: Send;

    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Execute against the rows. All-or-nothing: an error means no output.
    fn run(&self, rows: &[LedgerRow]) -> AnalyticsResult<Self::Output>;
}

impl AnalyticsJob for AbcClassifier {
    type Output = Vec<DimensionGroup>;

    fn name(&self) -> &'static str {
        "abc.classify"
    }

    fn run(&self, rows: &[LedgerRow]) -> AnalyticsResult<Self::Output> {
        self.classify(rows)
    }
}

/// Forecast for one product scope (empty = all products).
#[derive(Debug, Clone)]
pub struct ForecastJob {
    forecaster: Forecaster,
    product: String,
}

impl ForecastJob {
    pub fn new(forecaster: Forecaster, product: impl Into<String>) -> Self {
        Self {
            forecaster,
            product: product.into(),
        }
    }

    pub fn product(&self) -> &str {
        &self.product
    }
}

impl AnalyticsJob for ForecastJob {
    type Output = ForecastResult;

    fn name(&self) -> &'static str {
        "inventory.forecast"
    }

    fn run(&self, rows: &[LedgerRow]) -> AnalyticsResult<Self::Output> {
        self.forecaster.forecast(rows, &self.product)
    }
}
