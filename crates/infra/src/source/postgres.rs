//! Postgres-backed ledger source.
//!
//! Reads the sales ledger table (by default `Concrem_Value`) with `LIMIT/OFFSET`
//! paging. Table and column names come from configuration, never from requests, and
//! are validated as plain identifiers before being quoted into SQL.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use tracing::debug;

use salesboard_core::LedgerRow;

use super::{LedgerSource, RowFilter, SourceError};

pub const DEFAULT_LEDGER_TABLE: &str = "Concrem_Value";

/// Column names of the ledger table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerColumns {
    pub line_amount: String,
    pub quantity: String,
    pub unit_price: String,
    pub occurred_on: String,
    pub client: String,
    pub product: String,
    pub city: String,
    pub finish: String,
}

impl Default for LedgerColumns {
    fn default() -> Self {
        Self {
            line_amount: "LINE_AMOUNT".to_string(),
            quantity: "QUANTIDADE".to_string(),
            unit_price: "VRLUNIT".to_string(),
            occurred_on: "DATA".to_string(),
            client: "CLIENTE".to_string(),
            product: "DESCRICAO".to_string(),
            city: "CIDADE".to_string(),
            finish: "ACABAMENTO".to_string(),
        }
    }
}

impl LedgerColumns {
    fn all(&self) -> [&str; 8] {
        [
            self.line_amount.as_str(),
            self.quantity.as_str(),
            self.unit_price.as_str(),
            self.occurred_on.as_str(),
            self.client.as_str(),
            self.product.as_str(),
            self.city.as_str(),
            self.finish.as_str(),
        ]
    }
}

fn quote_ident(name: &str) -> Result<String, SourceError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if !valid {
        return Err(SourceError::Config(format!("invalid SQL identifier: {name:?}")));
    }
    Ok(format!("\"{name}\""))
}

/// Pre-rendered SQL for one table/column configuration.
#[derive(Debug, Clone)]
struct LedgerQueries {
    select: String,
    count: String,
    finish_predicate: String,
    order: String,
}

impl LedgerQueries {
    fn build(table: &str, columns: &LedgerColumns) -> Result<Self, SourceError> {
        for name in columns.all() {
            quote_ident(name)?;
        }
        let table = quote_ident(table)?;
        let c = |name: &String| format!("\"{name}\"");
        // Blank finishes decode to `None`, so the filter must treat them as missing too.
        let finish_label = format!("NULLIF(BTRIM({}::text), '')", c(&columns.finish));

        let select = format!(
            "SELECT \
             COALESCE({amount}, 0)::numeric AS line_amount, \
             COALESCE({qty}, 1)::numeric AS quantity, \
             COALESCE({price}, {amount}, 0)::numeric AS unit_price, \
             {date}::date AS occurred_on, \
             COALESCE({client}::text, '') AS client, \
             COALESCE({product}::text, '') AS product, \
             COALESCE({city}::text, '') AS city, \
             {finish_label} AS finish \
             FROM {table}",
            amount = c(&columns.line_amount),
            qty = c(&columns.quantity),
            price = c(&columns.unit_price),
            date = c(&columns.occurred_on),
            client = c(&columns.client),
            product = c(&columns.product),
            city = c(&columns.city),
        );

        Ok(Self {
            select,
            count: format!("SELECT COUNT(*) FROM {table}"),
            finish_predicate: format!(" WHERE {finish_label} IS NOT NULL"),
            // ctid breaks ties so consecutive pages never overlap.
            order: format!(" ORDER BY {} DESC NULLS LAST, ctid", c(&columns.line_amount)),
        })
    }

    fn page_sql(&self, filter: RowFilter) -> String {
        let mut sql = self.select.clone();
        if filter == RowFilter::WithFinish {
            sql.push_str(&self.finish_predicate);
        }
        sql.push_str(&self.order);
        sql.push_str(" LIMIT $1 OFFSET $2");
        sql
    }

    fn count_sql(&self, filter: RowFilter) -> String {
        let mut sql = self.count.clone();
        if filter == RowFilter::WithFinish {
            sql.push_str(&self.finish_predicate);
        }
        sql
    }
}

pub struct PostgresLedgerSource {
    pool: PgPool,
    queries: LedgerQueries,
}

impl PostgresLedgerSource {
    pub fn new(pool: PgPool, table: &str, columns: &LedgerColumns) -> Result<Self, SourceError> {
        Ok(Self {
            pool,
            queries: LedgerQueries::build(table, columns)?,
        })
    }

    /// Connect to `table` using the default column names.
    pub async fn connect(database_url: &str, table: &str) -> Result<Self, SourceError> {
        let pool = PgPool::connect(database_url).await?;
        Self::new(pool, table, &LedgerColumns::default())
    }
}

#[async_trait]
impl LedgerSource for PostgresLedgerSource {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn count(&self, filter: RowFilter) -> Result<u64, SourceError> {
        let sql = self.queries.count_sql(filter);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn fetch_page(
        &self,
        filter: RowFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<LedgerRow>, SourceError> {
        let sql = self.queries.page_sql(filter);
        debug!(offset, limit, ?filter, "fetching ledger page");

        let rows = sqlx::query(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| -> Result<LedgerRow, SourceError> {
                let line_amount: Decimal = r.try_get("line_amount")?;
                let quantity: Decimal = r.try_get("quantity")?;
                let unit_price: Decimal = r.try_get("unit_price")?;
                let occurred_on: NaiveDate = r.try_get("occurred_on")?;
                let client: String = r.try_get("client")?;
                let product: String = r.try_get("product")?;
                let city: String = r.try_get("city")?;
                let finish: Option<String> = r.try_get("finish")?;

                Ok(LedgerRow::new(line_amount, occurred_on, client, product, city)
                    .with_quantity(quantity, unit_price)
                    .with_finish(finish))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_queries_quote_the_ledger_columns() {
        let q = LedgerQueries::build(DEFAULT_LEDGER_TABLE, &LedgerColumns::default()).unwrap();

        let all = q.page_sql(RowFilter::All);
        assert!(all.contains("FROM \"Concrem_Value\""));
        assert!(all.contains("ORDER BY \"LINE_AMOUNT\" DESC NULLS LAST, ctid LIMIT $1 OFFSET $2"));
        assert!(!all.contains("WHERE"));

        let finished = q.page_sql(RowFilter::WithFinish);
        assert!(finished.contains("WHERE NULLIF(BTRIM(\"ACABAMENTO\"::text), '') IS NOT NULL ORDER BY"));

        assert_eq!(
            q.count_sql(RowFilter::WithFinish),
            "SELECT COUNT(*) FROM \"Concrem_Value\" WHERE NULLIF(BTRIM(\"ACABAMENTO\"::text), '') IS NOT NULL"
        );
    }

    #[test]
    fn finish_filter_matches_the_decoded_finish() {
        let q = LedgerQueries::build(DEFAULT_LEDGER_TABLE, &LedgerColumns::default()).unwrap();
        let label = "NULLIF(BTRIM(\"ACABAMENTO\"::text), '')";

        // Rows kept by the filter are exactly the rows that decode to `Some(finish)`.
        assert!(q.page_sql(RowFilter::All).contains(&format!("{label} AS finish")));
        assert!(q.page_sql(RowFilter::WithFinish).contains(&format!("WHERE {label} IS NOT NULL")));
        assert!(!q.count_sql(RowFilter::WithFinish).contains("WHERE \"ACABAMENTO\" IS NOT NULL"));
    }

    #[test]
    fn identifiers_are_validated() {
        let mut columns = LedgerColumns::default();
        columns.city = "CIDADE\"; DROP TABLE x; --".to_string();
        assert!(matches!(
            LedgerQueries::build(DEFAULT_LEDGER_TABLE, &columns),
            Err(SourceError::Config(_))
        ));
        assert!(LedgerQueries::build("1table", &LedgerColumns::default()).is_err());
        assert!(LedgerQueries::build("", &LedgerColumns::default()).is_err());
    }
}
