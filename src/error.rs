//! Error taxonomy for preprocessing and request handling.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::types::response::ErrorResponse;

/// Per-file preprocessing failure. Always recovered locally: the offending
/// file is skipped and the rest of the batch continues.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// The bytes are not a valid DICOM container (missing preamble, corrupt
    /// header, unsupported transfer syntax).
    #[error("invalid DICOM container: {0}")]
    Decode(String),

    /// The container parsed but its pixel data could not be decoded.
    #[error("failed to decode pixel data: {0}")]
    PixelData(String),

    /// The container carries no pixel frames.
    #[error("DICOM file contains no pixel frames")]
    EmptyPixelData,

    /// Windowing parameters collapse to an empty intensity range.
    #[error("degenerate windowing parameters (center {center}, width {width})")]
    DegenerateWindow { center: f64, width: f64 },

    /// Min-max fallback on a perfectly flat image would divide by zero.
    #[error("flat image with no dynamic range")]
    FlatImage,

    /// Pixel data has a samples-per-pixel count we cannot turn into an image.
    #[error("unsupported samples per pixel: {0}")]
    UnsupportedSamples(usize),

    /// The model expects a channel count we cannot produce.
    #[error("unsupported target channel count: {0}")]
    UnsupportedChannels(u32),

    /// Pixel buffer dimensions are internally inconsistent.
    #[error("pixel buffer does not match image dimensions")]
    Shape,
}

/// Request-level failure, mapped to an HTTP status and `{error}` JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No DICOM files provided")]
    NoFilesProvided,

    #[error("No valid DICOM files could be processed")]
    NoValidFiles,

    #[error("Model not loaded. Please check server logs.")]
    ModelUnavailable,

    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("Analysis failed: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NoFilesProvided | ApiError::NoValidFiles => StatusCode::BAD_REQUEST,
            ApiError::ModelUnavailable | ApiError::ModelNotLoaded | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
