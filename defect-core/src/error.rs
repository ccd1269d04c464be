//! Error taxonomy for the inference core.
//!
//! - `ModelLoadError`: artifacts could not be materialized. Fatal to the
//!   prediction capability, never to the host process.
//! - `FeatureError`: the submitted record does not satisfy the feature
//!   contract. Always raised before the model is touched.
//! - `PredictionError`: the scaler or model failed at call time.
//!
//! Degraded (label-only) prediction is not an error; it is reported through
//! `Prediction::degraded`.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt artifact {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("scaler was fit on a different feature set than the model (scaler {scaler:08x}, model {model:08x})")]
    FeatureOrderMismatch { scaler: u32, model: u32 },

    #[error("onnx runtime error: {0}")]
    Runtime(String),
}

impl ModelLoadError {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("missing feature: {0}")]
    Missing(String),

    #[error("unknown value '{value}' for categorical feature {feature}")]
    UnknownCategory { feature: String, value: String },

    #[error("invalid value for feature {feature}: {reason}")]
    InvalidValue { feature: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("feature vector has {actual} values, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("feature vector built for layout {actual:08x}, scaler expects {expected:08x}")]
    LayoutMismatch { expected: u32, actual: u32 },

    #[error("model returned invalid probability {0}")]
    InvalidProbability(f32),

    #[error("model returned invalid label {0}")]
    InvalidLabel(i64),

    #[error("model backend failure: {0}")]
    Backend(String),
}

/// Everything a single classify request can fail with.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(Arc<ModelLoadError>),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("threshold {0} outside the allowed range")]
    InvalidThreshold(f32),
}

pub type InferenceResult<T> = Result<T, InferenceError>;
