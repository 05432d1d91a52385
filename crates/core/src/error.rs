//! Analytics error model.

use thiserror::Error;

/// Result type used across the analytics layer.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Analytics-level error.
///
/// Every variant means "no result computed": callers never receive a partially
/// populated classification or forecast alongside one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// The requested grouping key is not one of the supported dimensions.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// A named product filter matched no rows and the caller required a match.
    #[error("no ledger rows for product: {0}")]
    EmptyProductScope(String),

    /// The row source failed; propagated, never generated by the analytics code itself.
    #[error("row source unavailable: {0}")]
    SourceUnavailable(String),

    /// A value failed validation (e.g. malformed month key, bad threshold).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An aggregate exceeded the decimal range (e.g. a near-zero grand total in
    /// return-heavy data).
    #[error("arithmetic overflow: {0}")]
    Overflow(String),

    /// A fault inside the engine itself, not caused by the input.
    #[error("internal analytics failure: {0}")]
    Internal(String),
}

impl AnalyticsError {
    pub fn invalid_dimension(msg: impl Into<String>) -> Self {
        Self::InvalidDimension(msg.into())
    }

    pub fn empty_product_scope(product: impl Into<String>) -> Self {
        Self::EmptyProductScope(product.into())
    }

    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
