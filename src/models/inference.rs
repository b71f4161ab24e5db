//! Per-request inference: preprocess every submitted file, score it, and
//! reduce the accumulated predictions to one verdict.

use anyhow::Result;
use ndarray::Array4;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::models::aggregator::{PredictionAccumulator, Verdict};
use crate::models::loader::ModelSpec;
use crate::preprocess::Preprocessor;
use crate::types::upload::UploadedFile;

/// Scoring capability: a fixed-shape-in, score-vector-out function.
///
/// `TumorModel` is the production implementation; tests substitute stubs so
/// the aggregation logic can be exercised without an ONNX runtime.
pub trait Scorer: Send + Sync {
    /// The input geometry the scorer expects.
    fn spec(&self) -> ModelSpec;

    /// Score one preprocessed `[1, H, W, C]` tensor.
    fn score(&self, input: &Array4<f32>) -> Result<Vec<f32>>;
}

/// Outcome of one analysis request, before the HTTP layer attaches timing
/// and model version.
#[derive(Debug, Clone)]
pub struct BatchAnalysis {
    pub verdict: Verdict,
    /// Element-wise mean of all per-file prediction vectors, kept raw for
    /// auditability.
    pub avg_prediction: Vec<f32>,
    pub processed_files: usize,
    pub total_files: usize,
}

/// Run the full analysis over one batch of uploaded files.
///
/// Files without a DICOM extension are silently skipped; per-file decode,
/// preprocess, and inference failures skip that file only. The request
/// fails as a whole only when no file at all produced a prediction.
pub fn analyze_batch<S: Scorer>(
    scorer: &S,
    files: &[UploadedFile],
) -> Result<BatchAnalysis, ApiError> {
    if files.is_empty() {
        return Err(ApiError::NoFilesProvided);
    }

    let preprocessor = Preprocessor::new(scorer.spec());
    let mut accumulator = PredictionAccumulator::new();

    for file in files {
        if !file.is_dicom() {
            debug!(file = %file.filename, "Skipping file without DICOM extension");
            continue;
        }

        let tensor = match preprocessor.preprocess(&file.bytes) {
            Ok(tensor) => tensor,
            Err(e) => {
                warn!(file = %file.filename, error = %e, "Preprocessing failed, skipping file");
                continue;
            }
        };

        match scorer.score(&tensor) {
            Ok(prediction) => {
                info!(
                    file = %file.filename,
                    outputs = prediction.len(),
                    "File scored"
                );
                accumulator.push(prediction);
            }
            Err(e) => {
                warn!(file = %file.filename, error = %e, "Inference failed, skipping file");
            }
        }
    }

    let avg_prediction = accumulator.mean().ok_or(ApiError::NoValidFiles)?;
    let verdict = Verdict::from_scores(&avg_prediction);

    info!(
        prediction = verdict.label(),
        confidence = verdict.confidence,
        processed = accumulator.len(),
        total = files.len(),
        "Analysis complete"
    );

    Ok(BatchAnalysis {
        verdict,
        avg_prediction,
        processed_files: accumulator.len(),
        total_files: files.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::gray_dicom;
    use anyhow::anyhow;

    /// Scorer returning a fixed vector for every file.
    struct StubScorer {
        output: Vec<f32>,
    }

    impl Scorer for StubScorer {
        fn spec(&self) -> ModelSpec {
            ModelSpec::default()
        }

        fn score(&self, input: &Array4<f32>) -> Result<Vec<f32>> {
            assert_eq!(input.dim(), (1, 224, 224, 3));
            Ok(self.output.clone())
        }
    }

    /// Scorer whose inference always fails.
    struct FailingScorer;

    impl Scorer for FailingScorer {
        fn spec(&self) -> ModelSpec {
            ModelSpec::default()
        }

        fn score(&self, _input: &Array4<f32>) -> Result<Vec<f32>> {
            Err(anyhow!("runtime exploded"))
        }
    }

    fn valid_file(name: &str) -> UploadedFile {
        UploadedFile::new(name, gray_dicom(4, 4, (0u8..16).map(|v| v * 16).collect(), None))
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let scorer = StubScorer { output: vec![0.9] };
        let result = analyze_batch(&scorer, &[]);
        assert!(matches!(result, Err(ApiError::NoFilesProvided)));
    }

    #[test]
    fn test_single_sigmoid_file_detects_tumor() {
        let scorer = StubScorer { output: vec![0.73] };
        let files = vec![valid_file("scan.dcm")];

        let analysis = analyze_batch(&scorer, &files).unwrap();
        assert_eq!(analysis.verdict.label(), "Tumor detected");
        assert!((analysis.verdict.confidence - 0.73).abs() < 1e-6);
        assert_eq!(analysis.processed_files, 1);
        assert_eq!(analysis.total_files, 1);
        assert_eq!(analysis.avg_prediction, vec![0.73]);
    }

    #[test]
    fn test_corrupt_file_is_skipped_not_fatal() {
        let scorer = StubScorer {
            output: vec![0.1, 0.6, 0.3],
        };
        let files = vec![
            UploadedFile::new("broken.dcm", vec![0xFF; 64]),
            valid_file("good.dcm"),
        ];

        let analysis = analyze_batch(&scorer, &files).unwrap();
        assert_eq!(analysis.processed_files, 1);
        assert_eq!(analysis.total_files, 2);
        assert_eq!(analysis.verdict.predicted_class, 1);
        assert!((analysis.verdict.confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_non_dicom_extension_counts_only_in_total() {
        let scorer = StubScorer { output: vec![0.2] };
        let files = vec![
            UploadedFile::new("report.txt", b"not an image".to_vec()),
            valid_file("scan.dcm"),
        ];

        let analysis = analyze_batch(&scorer, &files).unwrap();
        assert_eq!(analysis.processed_files, 1);
        assert_eq!(analysis.total_files, 2);
        assert_eq!(analysis.verdict.label(), "No tumor detected");
    }

    #[test]
    fn test_all_files_invalid_is_request_error() {
        let scorer = StubScorer { output: vec![0.9] };
        let files = vec![
            UploadedFile::new("broken.dcm", vec![0x00; 16]),
            UploadedFile::new("notes.pdf", vec![0x25, 0x50, 0x44, 0x46]),
        ];

        let result = analyze_batch(&scorer, &files);
        assert!(matches!(result, Err(ApiError::NoValidFiles)));
    }

    #[test]
    fn test_flat_image_is_skipped() {
        let scorer = StubScorer { output: vec![0.9] };
        let files = vec![UploadedFile::new(
            "flat.dcm",
            gray_dicom(2, 2, vec![42; 4], None),
        )];

        let result = analyze_batch(&scorer, &files);
        assert!(matches!(result, Err(ApiError::NoValidFiles)));
    }

    #[test]
    fn test_inference_failure_is_skipped() {
        let files = vec![valid_file("scan.dcm")];
        let result = analyze_batch(&FailingScorer, &files);
        assert!(matches!(result, Err(ApiError::NoValidFiles)));
    }

    #[test]
    fn test_mean_across_files_feeds_verdict() {
        // Stub returns the same vector per file, so the mean equals it; the
        // element-wise mean itself is covered by the aggregator tests.
        let scorer = StubScorer { output: vec![0.5] };
        let files = vec![valid_file("a.dcm"), valid_file("b.dcm")];

        let analysis = analyze_batch(&scorer, &files).unwrap();
        assert_eq!(analysis.processed_files, 2);
        // Boundary: 0.5 is not a detection.
        assert_eq!(analysis.verdict.predicted_class, 0);
        assert_eq!(analysis.verdict.label(), "No tumor detected");
    }
}
