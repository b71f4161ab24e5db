//! ONNX model loader and scoring handle.

use anyhow::{anyhow, Context, Result};
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{Tensor, ValueType};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use crate::models::inference::Scorer;

/// The model's declared input geometry (NHWC), resolved once at load time
/// and threaded into the preprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub height: u32,
    pub width: u32,
    pub channels: u32,
}

impl Default for ModelSpec {
    /// Safe defaults used when the model's shape is unknown or dynamic.
    fn default() -> Self {
        Self {
            height: 224,
            width: 224,
            channels: 3,
        }
    }
}

impl ModelSpec {
    /// Derive the spec from a `[batch, height, width, channels]` dim vector.
    /// Dynamic dimensions (<= 0) keep their defaults.
    fn from_dims(dims: &[i64]) -> Self {
        let mut spec = Self::default();
        if dims.len() == 4 {
            if dims[1] > 0 {
                spec.height = dims[1] as u32;
            }
            if dims[2] > 0 {
                spec.width = dims[2] as u32;
            }
            if dims[3] > 0 {
                spec.channels = dims[3] as u32;
            }
        }
        spec
    }
}

/// Typed model availability, checked by every request path.
pub enum ModelState {
    /// Startup load failed; analysis requests are rejected until the process
    /// restarts with a valid model file.
    Unloaded,
    Ready(TumorModel),
}

impl ModelState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }
}

/// Loaded ONNX classification model.
///
/// Immutable after construction; scoring locks the session only for the
/// duration of the `run` call, so concurrent requests stay safe.
pub struct TumorModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_dims: Vec<i64>,
    output_dims: Vec<i64>,
    spec: ModelSpec,
    total_params: u64,
    summary: String,
}

impl TumorModel {
    /// Load the model from an ONNX file. Called once at process startup.
    pub fn load<P: AsRef<Path>>(path: P, onnx_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        ort::init().commit()?;

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {:?}", path))?;

        let input = session
            .inputs
            .first()
            .context("model declares no inputs")?;
        let input_name = input.name.clone();
        let input_dims = tensor_dims(&input.input_type);

        let output = session
            .outputs
            .first()
            .context("model declares no outputs")?;
        let output_name = output.name.clone();
        let output_dims = tensor_dims(&output.output_type);

        let spec = ModelSpec::from_dims(&input_dims);

        // ONNX sessions do not expose a parameter count; honor the metadata
        // key when the exporter recorded one.
        let total_params = session
            .metadata()
            .ok()
            .and_then(|m| m.custom("total_params").ok().flatten())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        let summary = format!(
            "input {input_name} {input_dims:?} -> output {output_name} {output_dims:?}"
        );

        info!(
            path = %path.display(),
            input = %input_name,
            output = %output_name,
            spec = ?spec,
            threads = onnx_threads,
            "Model loaded successfully"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_dims,
            output_dims,
            spec,
            total_params,
            summary,
        })
    }

    pub fn input_shape_string(&self) -> String {
        shape_string(&self.input_dims)
    }

    pub fn output_shape_string(&self) -> String {
        shape_string(&self.output_dims)
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn total_params(&self) -> u64 {
        self.total_params
    }
}

impl Scorer for TumorModel {
    fn spec(&self) -> ModelSpec {
        self.spec
    }

    /// Run the model on one preprocessed tensor, returning the raw
    /// prediction vector for that file.
    fn score(&self, input: &Array4<f32>) -> Result<Vec<f32>> {
        let (batch, height, width, channels) = input.dim();
        let shape = vec![
            batch as i64,
            height as i64,
            width as i64,
            channels as i64,
        ];
        let data: Vec<f32> = input.iter().copied().collect();
        let input_tensor =
            Tensor::from_array((shape, data)).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("model lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs![&self.input_name => input_tensor])?;

        let value = outputs
            .get(self.output_name.as_str())
            .with_context(|| format!("model produced no output named {}", self.output_name))?;
        let (_, scores) = value.try_extract_tensor::<f32>()?;

        Ok(scores.to_vec())
    }
}

fn tensor_dims(value_type: &ValueType) -> Vec<i64> {
    match value_type {
        ValueType::Tensor { shape, .. } => shape.iter().copied().collect(),
        _ => Vec::new(),
    }
}

/// Render a dim vector the way shape tuples are conventionally printed,
/// with dynamic dimensions shown as `None`.
fn shape_string(dims: &[i64]) -> String {
    let rendered: Vec<String> = dims
        .iter()
        .map(|&d| {
            if d > 0 {
                d.to_string()
            } else {
                "None".to_string()
            }
        })
        .collect();
    format!("({})", rendered.join(", "))
}
