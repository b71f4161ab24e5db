//! DICOM preprocessing pipeline.
//!
//! Turns one raw imaging file into a normalized `[1, H, W, C]` f32 tensor
//! matching the model's declared input shape:
//!
//! 1. decode the container and extract pixel data as f32
//! 2. apply windowing (center/width) when present, min-max rescale otherwise
//! 3. resize to the model's spatial dimensions
//! 4. reconcile channel count (grayscale vs RGB)
//! 5. scale to [0, 1] and add the batch dimension

pub mod dicom;

use dicom_pixeldata::PixelDecoder;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbImage};
use ndarray::{Array4, ArrayD, ArrayViewD, Axis};

use crate::error::PreprocessError;
use crate::models::loader::ModelSpec;

pub use dicom::WindowingParameters;

/// Converts raw DICOM bytes into normalized model input tensors.
///
/// The model spec is captured once at construction; it is never re-queried
/// per file.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    spec: ModelSpec,
}

impl Preprocessor {
    pub fn new(spec: ModelSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> ModelSpec {
        self.spec
    }

    /// Run the full pipeline on one file.
    ///
    /// Any failure is local to this file; the caller logs it with filename
    /// context and skips the file.
    pub fn preprocess(&self, bytes: &[u8]) -> Result<Array4<f32>, PreprocessError> {
        let obj = dicom::decode_object(bytes)?;
        let windowing = dicom::windowing_of(&obj);

        let decoded = obj
            .decode_pixel_data()
            .map_err(|e| PreprocessError::PixelData(e.to_string()))?;
        let pixels = decoded
            .to_ndarray::<f32>()
            .map_err(|e| PreprocessError::PixelData(e.to_string()))?;

        // Shape is [frames, rows, cols, samples]; only the first frame is
        // scored, consistent with the single-frame assumption upstream.
        if pixels.shape().first().copied().unwrap_or(0) == 0 {
            return Err(PreprocessError::EmptyPixelData);
        }
        let frame = pixels.index_axis(Axis(0), 0).into_dyn();
        if frame.ndim() != 3 {
            return Err(PreprocessError::Shape);
        }

        let scaled = match windowing {
            Some(window) => apply_window(&frame, &window)?,
            None => rescale_minmax(&frame)?,
        };

        let image = to_image(&scaled)?;
        let resized = image.resize_exact(self.spec.width, self.spec.height, FilterType::Triangle);
        self.to_tensor(&resized)
    }

    /// Reconcile channels against the model spec and emit the final tensor.
    fn to_tensor(&self, image: &DynamicImage) -> Result<Array4<f32>, PreprocessError> {
        let height = self.spec.height as usize;
        let width = self.spec.width as usize;

        match self.spec.channels {
            3 => {
                let rgb = image.to_rgb8();
                let data: Vec<f32> = rgb.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();
                Array4::from_shape_vec((1, height, width, 3), data)
                    .map_err(|_| PreprocessError::Shape)
            }
            1 => {
                let luma = image.to_luma8();
                let data: Vec<f32> =
                    luma.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();
                Array4::from_shape_vec((1, height, width, 1), data)
                    .map_err(|_| PreprocessError::Shape)
            }
            other => Err(PreprocessError::UnsupportedChannels(other)),
        }
    }
}

/// Clip to `[center - width/2, center + width/2]` and rescale to `[0, 255]`.
///
/// The half-width uses floor division, preserving the integer-division
/// semantics of the windowing formula this pipeline replicates.
pub fn apply_window(
    frame: &ArrayViewD<'_, f32>,
    window: &WindowingParameters,
) -> Result<ArrayD<f32>, PreprocessError> {
    let half = (window.width / 2.0).floor();
    let lower = (window.center - half) as f32;
    let upper = (window.center + half) as f32;
    if upper <= lower {
        return Err(PreprocessError::DegenerateWindow {
            center: window.center,
            width: window.width,
        });
    }
    let range = upper - lower;
    Ok(frame.mapv(|v| (v.clamp(lower, upper) - lower) / range * 255.0))
}

/// Rescale using the array's own observed [min, max] to `[0, 255]`.
///
/// A flat image (min == max) would divide by zero; it is reported as an
/// error instead of silently propagating NaN into the aggregate.
pub fn rescale_minmax(frame: &ArrayViewD<'_, f32>) -> Result<ArrayD<f32>, PreprocessError> {
    let min = frame.iter().copied().fold(f32::INFINITY, f32::min);
    let max = frame.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !(max > min) {
        return Err(PreprocessError::FlatImage);
    }
    let range = max - min;
    Ok(frame.mapv(|v| (v - min) / range * 255.0))
}

/// Build an 8-bit image from a `[rows, cols, samples]` array of values in
/// `[0, 255]`. One sample becomes grayscale, three become RGB.
fn to_image(frame: &ArrayD<f32>) -> Result<DynamicImage, PreprocessError> {
    let shape = frame.shape();
    let (rows, cols, samples) = (shape[0], shape[1], shape[2]);
    let data: Vec<u8> = frame
        .iter()
        .map(|&v| v.clamp(0.0, 255.0).round() as u8)
        .collect();

    match samples {
        1 => GrayImage::from_raw(cols as u32, rows as u32, data)
            .map(DynamicImage::ImageLuma8)
            .ok_or(PreprocessError::Shape),
        3 => RgbImage::from_raw(cols as u32, rows as u32, data)
            .map(DynamicImage::ImageRgb8)
            .ok_or(PreprocessError::Shape),
        other => Err(PreprocessError::UnsupportedSamples(other)),
    }
}
