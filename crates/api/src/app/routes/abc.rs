use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use salesboard_analytics::{summarize, AbcClassifier};
use salesboard_core::{AnalyticsError, Dimension};
use salesboard_infra::{classify_all, run_job};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(abc_overview))
        .route("/:dimension", get(abc_for_dimension))
}

pub async fn abc_for_dimension(
    Extension(services): Extension<Arc<AppServices>>,
    Path(dimension): Path<String>,
) -> axum::response::Response {
    let dimension: Dimension = match dimension.parse() {
        Ok(d) => d,
        Err(e) => return errors::analytics_error_to_response(e),
    };

    let snapshot = match services.snapshot().await {
        Ok(s) => s,
        Err(e) => return errors::source_error_to_response(e),
    };

    let job = AbcClassifier::new(dimension).with_thresholds(services.thresholds());
    let groups = match run_job(&snapshot, &job) {
        Ok(g) => g,
        Err(e) => return errors::analytics_error_to_response(e),
    };

    let summary = match summarize(&groups) {
        Ok(s) => s,
        Err(e) => return errors::analytics_error_to_response(e),
    };

    Json(dto::AbcResponse {
        dimension,
        snapshot_id: snapshot.id(),
        groups,
        summary,
    })
    .into_response()
}

pub async fn abc_overview(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let snapshot = match services.snapshot().await {
        Ok(s) => s,
        Err(e) => return errors::source_error_to_response(e),
    };

    let thresholds = services.thresholds();
    let shared = snapshot.clone();
    let classified = match tokio::task::spawn_blocking(move || classify_all(&shared, thresholds)).await {
        Ok(Ok(all)) => all,
        Ok(Err(e)) => return errors::analytics_error_to_response(e),
        Err(e) => return errors::analytics_error_to_response(AnalyticsError::internal(e.to_string())),
    };

    let dimensions = classified
        .into_iter()
        .map(|(dimension, groups)| {
            summarize(&groups).map(|summary| dto::DimensionSummary { dimension, summary })
        })
        .collect::<Result<Vec<_>, _>>();

    match dimensions {
        Ok(dimensions) => Json(dto::AbcOverviewResponse {
            snapshot_id: snapshot.id(),
            dimensions,
        })
        .into_response(),
        Err(e) => errors::analytics_error_to_response(e),
    }
}
