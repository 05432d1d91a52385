use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    Json,
};

use salesboard_analytics::{product_labels, search_products};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ProductQuery>,
) -> axum::response::Response {
    let snapshot = match services.snapshot().await {
        Ok(s) => s,
        Err(e) => return errors::source_error_to_response(e),
    };

    let labels = product_labels(snapshot.rows());
    let search = dto::non_empty(query.search).unwrap_or_default();
    let products = search_products(&labels, &search)
        .into_iter()
        .map(str::to_string)
        .collect();

    Json(dto::ProductsResponse {
        snapshot_id: snapshot.id(),
        products,
    })
    .into_response()
}
