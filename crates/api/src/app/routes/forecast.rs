use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use salesboard_analytics::ForecastJob;
use salesboard_infra::{forecast_csv, run_job, EXPORT_FILENAME};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_forecast))
        .route("/export.csv", get(export_forecast))
}

pub async fn get_forecast(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ForecastQuery>,
) -> axum::response::Response {
    let product = dto::non_empty(query.product);

    let snapshot = match services.snapshot().await {
        Ok(s) => s,
        Err(e) => return errors::source_error_to_response(e),
    };

    let job = ForecastJob::new(services.forecaster(query.strict), product.clone().unwrap_or_default());
    match run_job(&snapshot, &job) {
        Ok(result) => Json(dto::ForecastResponse {
            snapshot_id: snapshot.id(),
            product,
            result,
        })
        .into_response(),
        Err(e) => errors::analytics_error_to_response(e),
    }
}

pub async fn export_forecast(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ExportQuery>,
) -> axum::response::Response {
    let product = dto::non_empty(query.product).unwrap_or_default();

    let snapshot = match services.snapshot().await {
        Ok(s) => s,
        Err(e) => return errors::source_error_to_response(e),
    };

    let job = ForecastJob::new(services.forecaster(false), product);
    let result = match run_job(&snapshot, &job) {
        Ok(r) => r,
        Err(e) => return errors::analytics_error_to_response(e),
    };

    let body = match forecast_csv(&result) {
        Ok(b) => b,
        Err(e) => return errors::export_error_to_response(e),
    };

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        body,
    )
        .into_response()
}
