//! Infrastructure layer: row sources, snapshot fetching, job execution, export.

pub mod export;
pub mod runner;
pub mod snapshot;
pub mod source;

pub use export::{forecast_csv, ExportError, EXPORT_FILENAME};
pub use runner::{classify_all, run_job};
pub use snapshot::{fetch_snapshot, LedgerSnapshot, PagingConfig, SnapshotMeta};
pub use source::{
    CsvLedgerSource, InMemoryLedgerSource, LedgerColumns, LedgerSource, PostgresLedgerSource,
    RowFilter, SourceError,
};
