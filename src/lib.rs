//! DICOM Tumor Detection Server Library
//!
//! An HTTP inference service that preprocesses DICOM studies into model-ready
//! tensors, scores them with a pre-trained ONNX classifier, and aggregates
//! per-file predictions into a single clinical verdict.

pub mod config;
pub mod error;
pub mod models;
pub mod preprocess;
pub mod server;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::AppConfig;
pub use error::{ApiError, PreprocessError};
pub use models::inference::analyze_batch;
pub use models::loader::{ModelSpec, TumorModel};
pub use preprocess::Preprocessor;
pub use types::upload::UploadedFile;
