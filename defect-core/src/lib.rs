//! Manufacturing defect prediction core.
//!
//! Loads a fitted classifier (and optional scaler) once, projects user input
//! onto the artifact-declared feature order, and classifies the predicted
//! defect probability against a user-chosen threshold.
//!
//! ```no_run
//! use defect_core::constants::artifact_config_from_env;
//! use defect_core::{FeatureRecord, LoadedArtifacts};
//!
//! // MODEL_PATH / SCALER_PATH, defaulting to artifacts/model.json
//! let artifacts = LoadedArtifacts::load(&artifact_config_from_env())?;
//! let record = FeatureRecord::new()
//!     .with("Temperature", 80.0)
//!     .with("Pressure", 5.2);
//! let prediction = artifacts.classifier.predict(&record, 0.70)?;
//! println!("{} {}", prediction.probability_percent(), prediction.verdict.label());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod artifact;
pub mod constants;
pub mod error;
pub mod features;
pub mod model;

pub use artifact::{ArtifactConfig, LoadedArtifacts, ModelCard, ModelInfo, ModelSpec};
pub use error::{FeatureError, InferenceError, InferenceResult, ModelLoadError, PredictionError};
pub use features::{build_feature_vector, FeatureOrder, FeatureRecord, FeatureValue, FeatureVector};
pub use model::inference::InferenceStats;
pub use model::{
    classify, predict_defect_probability, DefectClassifier, DefectModel, FeatureScaler,
    OutputCapability, Prediction, ProbabilityOutput, ThresholdConfig, Verdict,
};
