use std::sync::Arc;

use anyhow::Context;

use salesboard_api::{app, config::ApiConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    salesboard_observability::init();

    let config = ApiConfig::from_env()?;
    let services = Arc::new(app::services::build_services(&config).await?);
    let router = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}
