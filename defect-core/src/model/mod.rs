//! Model Module - Defect classifier inference
//!
//! Model backends and scalers sit behind the `DefectModel` / `FeatureScaler`
//! traits so the classifier never cares whether it talks to ONNX Runtime, a
//! native logistic regression, or a test stub.

pub mod inference;
pub mod logistic;
pub mod onnx;
pub mod scaler;
pub mod threshold;

use crate::error::PredictionError;

// Re-export common types
pub use inference::{
    classify, predict_defect_probability, DefectClassifier, Prediction, ProbabilityOutput, Verdict,
};
pub use logistic::LogisticModel;
pub use onnx::{OnnxModel, OnnxOutputs};
pub use scaler::{AlignedScaler, ScalerArtifact, ScalerParams};
pub use threshold::ThresholdConfig;

/// What a loaded model can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputCapability {
    /// `predict_proba` available
    Probability,
    /// Hard labels only (degraded mode)
    LabelOnly,
}

/// Trait for model backends (ONNX, native, test stubs)
pub trait DefectModel: Send + Sync {
    fn kind(&self) -> &'static str;

    fn capability(&self) -> OutputCapability;

    /// P(defect) for one row. Only meaningful with `OutputCapability::Probability`.
    fn predict_proba(&self, row: &[f32]) -> Result<f32, PredictionError>;

    /// Hard class label: 1 = defect, 0 = no defect.
    fn predict(&self, row: &[f32]) -> Result<i64, PredictionError>;
}

/// A fitted transformation applied before the model.
pub trait FeatureScaler: Send + Sync {
    /// Column order the scaler was fit with
    fn feature_names_in(&self) -> &[String];

    fn transform(&self, row: &[f32]) -> Result<Vec<f32>, PredictionError>;
}
