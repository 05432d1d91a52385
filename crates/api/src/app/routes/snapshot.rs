use std::sync::Arc;

use axum::{
    extract::Extension,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(current_snapshot))
        .route("/refresh", post(refresh_snapshot))
}

pub async fn current_snapshot(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.snapshot().await {
        Ok(snapshot) => Json(snapshot.meta()).into_response(),
        Err(e) => errors::source_error_to_response(e),
    }
}

pub async fn refresh_snapshot(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.refresh().await {
        Ok(snapshot) => Json(snapshot.meta()).into_response(),
        Err(e) => errors::source_error_to_response(e),
    }
}
