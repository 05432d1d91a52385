//! Sale-line records and their calendar-month key.

use core::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Calendar month (`YYYY-MM`) used both as bucket identity and sort key.
///
/// Field order makes the derived `Ord` chronological, which also matches the lexical
/// order of the display string for four-digit years.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, AnalyticsError> {
        if !(1..=12).contains(&month) {
            return Err(AnalyticsError::validation(format!(
                "month must be in 1..=12 (got {month})"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl From<NaiveDate> for MonthKey {
    fn from(value: NaiveDate) -> Self {
        Self::from_date(value)
    }
}

impl core::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| AnalyticsError::validation(format!("month key must be YYYY-MM: {s}")))?;
        let year = y
            .parse::<i32>()
            .map_err(|e| AnalyticsError::validation(format!("month key year: {e}")))?;
        let month = m
            .parse::<u32>()
            .map_err(|e| AnalyticsError::validation(format!("month key month: {e}")))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = AnalyticsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

/// One sale-line record of the ledger.
///
/// Rows are immutable once built; analytics only derive aggregates from them. The
/// calendar month is computed once here so bucketing never re-parses dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    line_amount: Decimal,
    quantity: Decimal,
    unit_price: Decimal,
    occurred_on: NaiveDate,
    month: MonthKey,
    client: String,
    product: String,
    city: String,
    finish: Option<String>,
}

impl LedgerRow {
    /// Build a row with its value metric and the three always-present labels.
    ///
    /// Quantity defaults to 1 and unit price to `line_amount`; use
    /// [`LedgerRow::with_quantity`] when the source carries them.
    pub fn new(
        line_amount: Decimal,
        occurred_on: NaiveDate,
        client: impl Into<String>,
        product: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            line_amount,
            quantity: Decimal::ONE,
            unit_price: line_amount,
            occurred_on,
            month: MonthKey::from_date(occurred_on),
            client: client.into(),
            product: product.into(),
            city: city.into(),
            finish: None,
        }
    }

    pub fn with_quantity(mut self, quantity: Decimal, unit_price: Decimal) -> Self {
        self.quantity = quantity;
        self.unit_price = unit_price;
        self
    }

    pub fn with_finish(mut self, finish: Option<String>) -> Self {
        self.finish = finish;
        self
    }

    /// Authoritative monetary value of the line (may be negative for returns).
    pub fn line_amount(&self) -> Decimal {
        self.line_amount
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn occurred_on(&self) -> NaiveDate {
        self.occurred_on
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn finish(&self) -> Option<&str> {
        self.finish.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_is_derived_at_construction() {
        let row = LedgerRow::new(dec!(10), date(2024, 3, 31), "ACME", "Widget", "Recife");
        assert_eq!(row.month().to_string(), "2024-03");
        assert_eq!(row.quantity(), Decimal::ONE);
        assert_eq!(row.unit_price(), dec!(10));
        assert_eq!(row.finish(), None);
    }

    #[test]
    fn month_keys_order_chronologically() {
        let mut keys = vec![
            MonthKey::new(2024, 2).unwrap(),
            MonthKey::new(2023, 12).unwrap(),
            MonthKey::new(2024, 10).unwrap(),
            MonthKey::new(2024, 1).unwrap(),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, vec!["2023-12", "2024-01", "2024-02", "2024-10"]);
    }

    #[test]
    fn month_key_parses_and_rejects_garbage() {
        assert_eq!("2024-07".parse::<MonthKey>().unwrap(), MonthKey::new(2024, 7).unwrap());
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("202407".parse::<MonthKey>().is_err());
        assert!("abcd-01".parse::<MonthKey>().is_err());
    }

    #[test]
    fn month_key_serializes_as_string() {
        let key = MonthKey::new(2024, 1).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-01\"");
        let back: MonthKey = serde_json::from_str("\"2024-01\"").unwrap();
        assert_eq!(back, key);
    }
}
