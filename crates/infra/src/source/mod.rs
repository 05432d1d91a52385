//! Ledger row sources.
//!
//! A source only knows how to count and page through the ledger; turning pages into a
//! completed snapshot (and retrying) is the job of [`crate::snapshot::fetch_snapshot`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use salesboard_core::{AnalyticsError, LedgerRow};

pub mod csv;
pub mod in_memory;
pub mod postgres;

pub use self::csv::CsvLedgerSource;
pub use in_memory::InMemoryLedgerSource;
pub use postgres::{LedgerColumns, PostgresLedgerSource};

/// Row predicate understood by every source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowFilter {
    #[default]
    All,
    /// Only rows whose finish label is present.
    WithFinish,
}

impl RowFilter {
    pub fn matches(&self, row: &LedgerRow) -> bool {
        match self {
            RowFilter::All => true,
            RowFilter::WithFinish => row.finish().is_some(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("malformed ledger row {line}: {reason}")]
    Decode { line: u64, reason: String },

    #[error("invalid source configuration: {0}")]
    Config(String),

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Database(e) => !matches!(
                e,
                sqlx::Error::ColumnNotFound(_)
                    | sqlx::Error::ColumnDecode { .. }
                    | sqlx::Error::Decode(_)
                    | sqlx::Error::TypeNotFound { .. }
                    | sqlx::Error::Configuration(_)
            ),
            SourceError::Io(_) | SourceError::Unavailable(_) => true,
            SourceError::Csv(_) | SourceError::Decode { .. } | SourceError::Config(_) => false,
        }
    }
}

impl From<SourceError> for AnalyticsError {
    fn from(value: SourceError) -> Self {
        AnalyticsError::source_unavailable(value.to_string())
    }
}

/// Paginated access to the ledger.
///
/// Pages are ordered by `line_amount` descending. A page shorter than `limit` marks the
/// end of the data.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Number of rows matching `filter`, as reported by the source.
    async fn count(&self, filter: RowFilter) -> Result<u64, SourceError>;

    async fn fetch_page(
        &self,
        filter: RowFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<LedgerRow>, SourceError>;
}

#[async_trait]
impl<S> LedgerSource for Arc<S>
where
    S: LedgerSource + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn count(&self, filter: RowFilter) -> Result<u64, SourceError> {
        (**self).count(filter).await
    }

    async fn fetch_page(
        &self,
        filter: RowFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<LedgerRow>, SourceError> {
        (**self).fetch_page(filter, offset, limit).await
    }
}
