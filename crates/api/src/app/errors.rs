use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use salesboard_core::AnalyticsError;
use salesboard_infra::{ExportError, SourceError};

pub fn analytics_error_to_response(err: AnalyticsError) -> axum::response::Response {
    let (status, code) = match &err {
        AnalyticsError::InvalidDimension(_) => (StatusCode::BAD_REQUEST, "invalid_dimension"),
        AnalyticsError::EmptyProductScope(_) => (StatusCode::NOT_FOUND, "empty_product_scope"),
        AnalyticsError::SourceUnavailable(_) => (StatusCode::BAD_GATEWAY, "source_unavailable"),
        AnalyticsError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        AnalyticsError::Overflow(_) => (StatusCode::UNPROCESSABLE_ENTITY, "arithmetic_overflow"),
        AnalyticsError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    json_error(status, code, err.to_string())
}

pub fn source_error_to_response(err: SourceError) -> axum::response::Response {
    tracing::error!(error = %err, "ledger snapshot unavailable");
    analytics_error_to_response(err.into())
}

pub fn export_error_to_response(err: ExportError) -> axum::response::Response {
    tracing::error!(error = %err, "forecast export failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "export_error", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
