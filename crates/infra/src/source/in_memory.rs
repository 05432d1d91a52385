use async_trait::async_trait;

use salesboard_core::LedgerRow;

use super::{LedgerSource, RowFilter, SourceError};

/// In-memory ledger for tests/dev (and the backing store of the CSV source).
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerSource {
    /// Kept in source order: `line_amount` descending, ties in insertion order.
    rows: Vec<LedgerRow>,
}

impl InMemoryLedgerSource {
    pub fn new(rows: impl IntoIterator<Item = LedgerRow>) -> Self {
        let mut rows: Vec<LedgerRow> = rows.into_iter().collect();
        rows.sort_by(|a, b| b.line_amount().cmp(&a.line_amount()));
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl LedgerSource for InMemoryLedgerSource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn count(&self, filter: RowFilter) -> Result<u64, SourceError> {
        Ok(self.rows.iter().filter(|r| filter.matches(r)).count() as u64)
    }

    async fn fetch_page(
        &self,
        filter: RowFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<LedgerRow>, SourceError> {
        Ok(self
            .rows
            .iter()
            .filter(|r| filter.matches(r))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn row(client: &str, amount: rust_decimal::Decimal, finish: Option<&str>) -> LedgerRow {
        let date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        LedgerRow::new(amount, date, client, "p", "x").with_finish(finish.map(str::to_string))
    }

    #[tokio::test]
    async fn pages_are_ordered_by_amount_descending() {
        let source = InMemoryLedgerSource::new(vec![
            row("small", dec!(1), None),
            row("big", dec!(100), Some("Polido")),
            row("mid", dec!(10), None),
        ]);

        let first = source.fetch_page(RowFilter::All, 0, 2).await.unwrap();
        let rest = source.fetch_page(RowFilter::All, 2, 2).await.unwrap();

        let clients: Vec<&str> = first.iter().chain(rest.iter()).map(|r| r.client()).collect();
        assert_eq!(clients, vec!["big", "mid", "small"]);
        assert_eq!(rest.len(), 1);
    }

    #[tokio::test]
    async fn finish_filter_applies_to_count_and_pages() {
        let source = InMemoryLedgerSource::new(vec![
            row("a", dec!(5), Some("Escovado")),
            row("b", dec!(6), None),
            row("c", dec!(7), Some("Polido")),
        ]);

        assert_eq!(source.count(RowFilter::All).await.unwrap(), 3);
        assert_eq!(source.count(RowFilter::WithFinish).await.unwrap(), 2);

        let page = source.fetch_page(RowFilter::WithFinish, 0, 10).await.unwrap();
        assert!(page.iter().all(|r| r.finish().is_some()));
        assert_eq!(page.len(), 2);
    }
}
