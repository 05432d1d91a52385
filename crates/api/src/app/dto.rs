use serde::{Deserialize, Serialize};

use salesboard_analytics::{AbcSummary, DimensionGroup, ForecastResult};
use salesboard_core::{Dimension, SnapshotId};

// -------------------------
// Query parameters
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    /// Exact product label; absent or empty means "all products".
    pub product: Option<String>,
    /// Answer 404 instead of a zeroed forecast when `product` matches nothing.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub product: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
}

// -------------------------
// Response bodies
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbcResponse {
    pub dimension: Dimension,
    pub snapshot_id: SnapshotId,
    pub groups: Vec<DimensionGroup>,
    pub summary: AbcSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionSummary {
    pub dimension: Dimension,
    pub summary: AbcSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbcOverviewResponse {
    pub snapshot_id: SnapshotId,
    pub dimensions: Vec<DimensionSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub snapshot_id: SnapshotId,
    pub product: Option<String>,
    #[serde(flatten)]
    pub result: ForecastResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsResponse {
    pub snapshot_id: SnapshotId,
    pub products: Vec<String>,
}

/// Empty strings in query parameters mean "not set".
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
