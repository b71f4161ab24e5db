//! HTTP surface: routing, multipart form handling, and response shaping.
//!
//! The endpoint paths, request fields, response shapes, and status codes are
//! a compatibility contract; see `types::response` for the schemas.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::ApiError;
use crate::models::inference::analyze_batch;
use crate::models::loader::ModelState;
use crate::types::response::{
    AnalysisDetails, AnalysisResponse, HealthResponse, ModelInfoResponse,
};
use crate::types::upload::UploadedFile;

const DEFAULT_ANALYSIS_TYPE: &str = "pancreatic_tumor_detection";

/// Process-wide state: the model handle is immutable after startup and
/// shared read-only across requests.
pub struct AppState {
    pub model: ModelState,
    pub model_path: String,
    pub model_version: String,
}

/// Build the application router. CORS is permissive for all routes, as the
/// upstream browser clients expect.
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/v1/analyze-dicom", post(analyze_dicom))
        .route("/health", get(health))
        .route("/model-info", get(model_info))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `POST /api/v1/analyze-dicom`: run the whole pipeline over the uploaded
/// batch and return one aggregate verdict.
async fn analyze_dicom(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let start = Instant::now();

    // The model check precedes form parsing; an unloaded model rejects the
    // request before any file bytes are read.
    let ModelState::Ready(model) = &state.model else {
        return Err(ApiError::ModelUnavailable);
    };

    let mut files = Vec::new();
    let mut user_id = String::new();
    let mut analysis_type = DEFAULT_ANALYSIS_TYPE.to_string();

    while let Some(field) = multipart.next_field().await.map_err(internal)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "dicom_files" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await.map_err(internal)?;
                files.push(UploadedFile::new(filename, bytes.to_vec()));
            }
            "user_id" => user_id = field.text().await.map_err(internal)?,
            "analysis_type" => analysis_type = field.text().await.map_err(internal)?,
            _ => {}
        }
    }

    info!(
        files = files.len(),
        user_id = %user_id,
        analysis_type = %analysis_type,
        "Processing DICOM analysis request"
    );

    let analysis = analyze_batch(model, &files)?;

    Ok(Json(AnalysisResponse {
        prediction: analysis.verdict.label().to_string(),
        confidence: analysis.verdict.confidence,
        processed_files: analysis.processed_files,
        total_files: analysis.total_files,
        processing_time: start.elapsed().as_secs_f64(),
        model_version: state.model_version.clone(),
        analysis_details: AnalysisDetails {
            avg_prediction_raw: analysis.avg_prediction,
            individual_predictions: analysis.processed_files,
        },
    }))
}

/// `GET /health`: liveness plus model availability. Always 200.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.model.is_loaded(),
        model_path: state.model_path.clone(),
        model_exists: Path::new(&state.model_path).exists(),
    })
}

/// `GET /model-info`: introspection of the loaded model.
async fn model_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelInfoResponse>, ApiError> {
    let ModelState::Ready(model) = &state.model else {
        return Err(ApiError::ModelNotLoaded);
    };

    Ok(Json(ModelInfoResponse {
        input_shape: model.input_shape_string(),
        output_shape: model.output_shape_string(),
        model_summary: model.summary().to_string(),
        total_params: model.total_params(),
    }))
}

fn internal<E: std::fmt::Display>(e: E) -> ApiError {
    ApiError::Internal(e.to_string())
}
