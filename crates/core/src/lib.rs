//! `salesboard-core`: ledger primitives shared by every layer.
//!
//! This crate contains **pure data** types (no IO): the immutable sale-line record,
//! its calendar-month key, the classification dimensions and the common error type.

pub mod dimension;
pub mod error;
pub mod id;
pub mod ledger;

pub use dimension::Dimension;
pub use error::{AnalyticsError, AnalyticsResult};
pub use id::SnapshotId;
pub use ledger::{LedgerRow, MonthKey};
