//! CSV ledger export loaded into memory.
//!
//! Expected headers (the ledger table's own column names):
//! `LINE_AMOUNT,QUANTIDADE,VRLUNIT,DATA,CLIENTE,DESCRICAO,CIDADE,ACABAMENTO`

use std::io::Read;
use std::path::Path;

use ::csv::ReaderBuilder;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use salesboard_core::LedgerRow;

use super::{InMemoryLedgerSource, LedgerSource, RowFilter, SourceError};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "LINE_AMOUNT")]
    line_amount: String,
    #[serde(rename = "QUANTIDADE", default)]
    quantity: Option<String>,
    #[serde(rename = "VRLUNIT", default)]
    unit_price: Option<String>,
    #[serde(rename = "DATA")]
    occurred_on: String,
    #[serde(rename = "CLIENTE", default)]
    client: String,
    #[serde(rename = "DESCRICAO", default)]
    product: String,
    #[serde(rename = "CIDADE", default)]
    city: String,
    #[serde(rename = "ACABAMENTO", default)]
    finish: Option<String>,
}

impl CsvRow {
    fn into_ledger_row(self, line: u64) -> Result<LedgerRow, SourceError> {
        let decode = |reason: String| SourceError::Decode { line, reason };

        let line_amount = parse_decimal(&self.line_amount)
            .map_err(|e| decode(format!("LINE_AMOUNT: {e}")))?;
        let quantity = optional_decimal(self.quantity.as_deref())
            .map_err(|e| decode(format!("QUANTIDADE: {e}")))?
            .unwrap_or(Decimal::ONE);
        let unit_price = optional_decimal(self.unit_price.as_deref())
            .map_err(|e| decode(format!("VRLUNIT: {e}")))?
            .unwrap_or(line_amount);
        let occurred_on = parse_date(&self.occurred_on).map_err(|e| decode(format!("DATA: {e}")))?;
        let finish = self
            .finish
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());

        Ok(LedgerRow::new(
            line_amount,
            occurred_on,
            self.client.trim(),
            self.product.trim(),
            self.city.trim(),
        )
        .with_quantity(quantity, unit_price)
        .with_finish(finish))
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal, rust_decimal::Error> {
    raw.trim().parse::<Decimal>()
}

fn optional_decimal(raw: Option<&str>) -> Result<Option<Decimal>, rust_decimal::Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_decimal(v).map(Some),
    }
}

/// Accepts plain dates and timestamps (only the `YYYY-MM-DD` prefix is used).
fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
}

/// Ledger loaded once from CSV, then served like the in-memory source.
#[derive(Debug, Clone)]
pub struct CsvLedgerSource {
    inner: InMemoryLedgerSource,
}

impl CsvLedgerSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let source = Self::from_reader(file)?;
        info!(path = %path.display(), rows = source.inner.len(), "loaded ledger CSV");
        Ok(source)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SourceError> {
        let mut rdr = ReaderBuilder::new().flexible(true).trim(::csv::Trim::Headers).from_reader(reader);

        let mut rows = Vec::new();
        for (i, rec) in rdr.deserialize::<CsvRow>().enumerate() {
            // Line 1 is the header.
            let line = i as u64 + 2;
            rows.push(rec?.into_ledger_row(line)?);
        }

        Ok(Self {
            inner: InMemoryLedgerSource::new(rows),
        })
    }
}

#[async_trait]
impl LedgerSource for CsvLedgerSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn count(&self, filter: RowFilter) -> Result<u64, SourceError> {
        self.inner.count(filter).await
    }

    async fn fetch_page(
        &self,
        filter: RowFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<LedgerRow>, SourceError> {
        self.inner.fetch_page(filter, offset, limit).await
    }
}
