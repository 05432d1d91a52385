use axum::{routing::get, Router};

pub mod abc;
pub mod forecast;
pub mod products;
pub mod snapshot;
pub mod system;

/// Router for every analytics endpoint (everything except `/health`).
pub fn router() -> Router {
    Router::new()
        .nest("/snapshot", snapshot::router())
        .nest("/abc", abc::router())
        .nest("/forecast", forecast::router())
        .route("/products", get(products::list_products))
}
