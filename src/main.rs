//! DICOM Tumor Detection Server - Main Entry Point
//!
//! Loads the ONNX model once at startup and serves the analysis, health,
//! and model-info endpoints. A model that fails to load leaves the process
//! running: health stays available and analysis requests are rejected.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tumor_detection_server::{
    config::AppConfig,
    models::loader::{ModelState, TumorModel},
    server::{router, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                format!("tumor_detection_server={}", config.logging.level).parse()?,
            ),
        )
        .init();

    info!("Starting DICOM tumor detection server");

    let model = match TumorModel::load(&config.model.path, config.model.onnx_threads) {
        Ok(model) => ModelState::Ready(model),
        Err(e) => {
            error!(
                path = %config.model.path,
                error = %e,
                "Failed to load model; analysis requests will be rejected until restart"
            );
            ModelState::Unloaded
        }
    };

    let state = Arc::new(AppState {
        model,
        model_path: config.model.path.clone(),
        model_version: config.model.version.clone(),
    });

    let app = router(state, config.server.max_upload_bytes);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!(%addr, "Listening for analysis requests");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
