use dotenvy::dotenv;
use service_core::observability::{init_metrics, init_tracing};
use std::sync::Arc;
use tracing::info;
use uploads_frontend::config::get_configuration;
use uploads_frontend::services::{store::UploadStore, upload_client::UploadClient};
use uploads_frontend::startup::build_router;
use uploads_frontend::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_metrics()?;
    init_tracing(
        "uploads-frontend",
        &configuration.server.log_level,
        configuration.server.otlp_endpoint.as_deref(),
    )?;

    let upload_client = Arc::new(UploadClient::new(configuration.upload_service.clone()));
    let state = AppState::new(upload_client, Arc::new(UploadStore::new()));

    let app = build_router(state, configuration.server.max_body_bytes);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!(
        upload_service = %configuration.upload_service.url,
        "Starting uploads-frontend on {}", address
    );
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
