//! Response schemas for the HTTP surface.
//!
//! Each endpoint serializes an explicit record at the boundary; the field
//! names are part of the wire contract and must not change.

use serde::{Deserialize, Serialize};

/// Body of a successful `POST /api/v1/analyze-dicom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Clinical verdict: "Tumor detected" or "No tumor detected".
    pub prediction: String,
    /// Confidence score derived from the averaged prediction vector.
    pub confidence: f64,
    /// Files that made it through preprocessing and inference.
    pub processed_files: usize,
    /// All files submitted in the form, regardless of extension.
    pub total_files: usize,
    /// Wall-clock request duration in seconds.
    pub processing_time: f64,
    /// Model version string from configuration.
    pub model_version: String,
    pub analysis_details: AnalysisDetails,
}

/// Audit trail for the aggregation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisDetails {
    /// Element-wise mean of all per-file prediction vectors.
    pub avg_prediction_raw: Vec<f32>,
    /// Number of prediction vectors that went into the mean.
    pub individual_predictions: usize,
}

/// Body of `GET /health`. Always 200.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub model_path: String,
    pub model_exists: bool,
}

/// Body of a successful `GET /model-info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub input_shape: String,
    pub output_shape: String,
    pub model_summary: String,
    pub total_params: u64,
}

/// Error body shared by all non-200 responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
