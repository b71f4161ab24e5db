//! Model loading, scoring, and prediction aggregation.

pub mod aggregator;
pub mod inference;
pub mod loader;

pub use aggregator::{PredictionAccumulator, Verdict};
pub use inference::{analyze_batch, BatchAnalysis, Scorer};
pub use loader::{ModelSpec, ModelState, TumorModel};
