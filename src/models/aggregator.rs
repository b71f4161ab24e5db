//! Aggregation of per-file prediction vectors into one verdict.

/// Accumulates prediction vectors across the files of one request.
///
/// Purely request-scoped; there is no cross-request memory.
#[derive(Debug, Default)]
pub struct PredictionAccumulator {
    predictions: Vec<Vec<f32>>,
}

impl PredictionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, prediction: Vec<f32>) {
        self.predictions.push(prediction);
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Element-wise arithmetic mean of all accumulated vectors.
    ///
    /// Returns `None` when nothing was accumulated: zero valid files is a
    /// request-level error, not a zero-confidence result. All vectors are
    /// expected to share the first vector's length.
    pub fn mean(&self) -> Option<Vec<f32>> {
        let first = self.predictions.first()?;
        let dim = first.len();
        let count = self.predictions.len() as f64;

        let mut sums = vec![0.0f64; dim];
        for prediction in &self.predictions {
            for (slot, &value) in sums.iter_mut().zip(prediction.iter()) {
                *slot += value as f64;
            }
        }

        Some(sums.into_iter().map(|s| (s / count) as f32).collect())
    }
}

/// Final decision derived from the averaged prediction vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub predicted_class: usize,
    pub confidence: f64,
}

impl Verdict {
    /// Apply the decision rule to an averaged prediction vector.
    ///
    /// Scalar or single-element vector: sigmoid-style, class 1 iff the value
    /// strictly exceeds 0.5. Longer vector: categorical, argmax wins with
    /// the first maximum taken on ties.
    pub fn from_scores(avg: &[f32]) -> Self {
        if avg.len() <= 1 {
            let confidence = avg.first().copied().unwrap_or(0.0) as f64;
            Self {
                predicted_class: usize::from(confidence > 0.5),
                confidence,
            }
        } else {
            let mut predicted_class = 0;
            let mut best = avg[0];
            for (index, &score) in avg.iter().enumerate().skip(1) {
                if score > best {
                    best = score;
                    predicted_class = index;
                }
            }
            Self {
                predicted_class,
                confidence: best as f64,
            }
        }
    }

    /// Map the class index to the clinical verdict label.
    pub fn label(&self) -> &'static str {
        if self.predicted_class == 0 {
            "No tumor detected"
        } else {
            "Tumor detected"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_is_elementwise() {
        let mut acc = PredictionAccumulator::new();
        acc.push(vec![0.2, 0.8, 0.0]);
        acc.push(vec![0.4, 0.6, 1.0]);

        let mean = acc.mean().unwrap();
        assert_eq!(mean.len(), 3);
        assert!((mean[0] - 0.3).abs() < 1e-6);
        assert!((mean[1] - 0.7).abs() < 1e-6);
        assert!((mean[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_accumulator_has_no_mean() {
        let acc = PredictionAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc.mean().is_none());
    }

    #[test]
    fn test_sigmoid_above_threshold_is_tumor() {
        let verdict = Verdict::from_scores(&[0.73]);
        assert_eq!(verdict.predicted_class, 1);
        assert!((verdict.confidence - 0.73).abs() < 1e-6);
        assert_eq!(verdict.label(), "Tumor detected");
    }

    #[test]
    fn test_sigmoid_boundary_is_class_zero() {
        // Strictly-greater rule: exactly 0.5 is not a detection.
        let verdict = Verdict::from_scores(&[0.5]);
        assert_eq!(verdict.predicted_class, 0);
        assert_eq!(verdict.label(), "No tumor detected");
    }

    #[test]
    fn test_categorical_takes_argmax() {
        let verdict = Verdict::from_scores(&[0.1, 0.6, 0.3]);
        assert_eq!(verdict.predicted_class, 1);
        assert!((verdict.confidence - 0.6).abs() < 1e-6);
        assert_eq!(verdict.label(), "Tumor detected");
    }

    #[test]
    fn test_categorical_tie_takes_first_maximum() {
        let verdict = Verdict::from_scores(&[0.4, 0.4, 0.2]);
        assert_eq!(verdict.predicted_class, 0);
    }

    #[test]
    fn test_empty_scores_default_to_class_zero() {
        let verdict = Verdict::from_scores(&[]);
        assert_eq!(verdict.predicted_class, 0);
        assert_eq!(verdict.confidence, 0.0);
    }
}
