//! Artifact Loading
//!
//! The explicit, one-time initialization step: read the model card (and the
//! optional scaler), materialize the backend, and hand back an immutable
//! `LoadedArtifacts`. Callers keep it behind an `Arc` for the process
//! lifetime; nothing here is global.
//!
//! Model card (`model.json`):
//!
//! ```json
//! {
//!   "name": "defect-classifier",
//!   "version": "3",
//!   "feature_names_in": ["Temperature", "Pressure", "Shift"],
//!   "categories": { "Shift": ["Morning", "Evening", "Night"] },
//!   "model": { "kind": "onnx", "path": "model.onnx", "sha256": "..." }
//! }
//! ```
//!
//! `model` may also be `{"kind": "logistic", "coefficients": [...], "intercept": 0.0}`.

pub mod checksum;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelLoadError;
use crate::features::FeatureOrder;
use crate::model::{
    DefectClassifier, DefectModel, LogisticModel, OnnxModel, OnnxOutputs,
    OutputCapability, ScalerArtifact, ThresholdConfig,
};

// ============================================================================
// CONFIG & CARD
// ============================================================================

/// Where the artifacts live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub model_path: PathBuf,
    #[serde(default)]
    pub scaler_path: Option<PathBuf>,
}

impl ArtifactConfig {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            scaler_path: None,
        }
    }

    pub fn with_scaler(mut self, scaler_path: impl Into<PathBuf>) -> Self {
        self.scaler_path = Some(scaler_path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCard {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub feature_names_in: Vec<String>,
    #[serde(default)]
    pub categories: HashMap<String, Vec<String>>,
    pub model: ModelSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Logistic(LogisticModel),
    Onnx {
        /// Relative paths resolve against the card's directory
        path: PathBuf,
        #[serde(default)]
        sha256: Option<String>,
        #[serde(default)]
        outputs: OnnxOutputs,
    },
}

impl ModelCard {
    fn validate(&self) -> Result<(), String> {
        if self.feature_names_in.is_empty() {
            return Err("feature_names_in is empty".to_string());
        }

        let mut seen = HashSet::new();
        for name in &self.feature_names_in {
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate feature {}", name));
            }
        }

        for (feature, values) in &self.categories {
            if !seen.contains(feature.as_str()) {
                return Err(format!("categories declared for unknown feature {}", feature));
            }
            if values.is_empty() {
                return Err(format!("empty category list for {}", feature));
            }
        }

        if let ModelSpec::Logistic(model) = &self.model {
            if model.coefficients.len() != self.feature_names_in.len() {
                return Err(format!(
                    "{} coefficients for {} features",
                    model.coefficients.len(),
                    self.feature_names_in.len()
                ));
            }
            if !model.intercept.is_finite() || model.coefficients.iter().any(|w| !w.is_finite()) {
                return Err("logistic parameters must be finite".to_string());
            }
        }

        Ok(())
    }

    fn feature_order(&self) -> FeatureOrder {
        let mut features: Vec<&String> = self.categories.keys().collect();
        features.sort();

        features.into_iter().fold(
            FeatureOrder::new(self.feature_names_in.iter().cloned()),
            |order, feature| order.with_categories(feature.clone(), self.categories[feature].iter().cloned()),
        )
    }
}

// ============================================================================
// LOADED ARTIFACTS
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: Option<String>,
    pub kind: String,
    pub model_path: PathBuf,
    pub scaler_path: Option<PathBuf>,
    pub feature_names: Vec<String>,
    pub layout_fingerprint: u32,
    pub categories: HashMap<String, Vec<String>>,
    pub capability: OutputCapability,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct LoadedArtifacts {
    pub classifier: DefectClassifier,
    pub info: ModelInfo,
}

impl LoadedArtifacts {
    /// Deserialize the artifacts once. Any failure is a `ModelLoadError`.
    pub fn load(config: &ArtifactConfig) -> Result<Self, ModelLoadError> {
        Self::load_with_thresholds(config, ThresholdConfig::default())
    }

    pub fn load_with_thresholds(
        config: &ArtifactConfig,
        thresholds: ThresholdConfig,
    ) -> Result<Self, ModelLoadError> {
        log::info!("Loading model card from: {}", config.model_path.display());

        let card: ModelCard = read_json(&config.model_path)?;
        card.validate()
            .map_err(|reason| ModelLoadError::corrupt(&config.model_path, reason))?;

        let model = build_model(&card, &config.model_path)?;
        let mut classifier = DefectClassifier::new(model, card.feature_order())
            .with_thresholds(thresholds);

        if let Some(scaler_path) = &config.scaler_path {
            let scaler = load_scaler(scaler_path)?;
            classifier = classifier.with_scaler(Box::new(scaler))?;
        }

        let order = classifier.feature_order();
        let info = ModelInfo {
            name: card.name.clone(),
            version: card.version.clone(),
            kind: classifier.model_kind().to_string(),
            model_path: config.model_path.clone(),
            scaler_path: config.scaler_path.clone(),
            feature_names: order.names().to_vec(),
            layout_fingerprint: order.fingerprint(),
            categories: card.categories.clone(),
            capability: if classifier.is_degraded() {
                OutputCapability::LabelOnly
            } else {
                OutputCapability::Probability
            },
            loaded_at: Utc::now(),
        };

        log::info!(
            "Model '{}' loaded: {} backend, {} features (layout {:08x}), scaler: {}",
            info.name,
            info.kind,
            info.feature_names.len(),
            info.layout_fingerprint,
            classifier.has_scaler()
        );
        if classifier.is_degraded() {
            log::warn!("Model '{}' exposes labels only; predictions will be degraded", info.name);
        }

        Ok(Self { classifier, info })
    }
}

fn build_model(card: &ModelCard, card_path: &Path) -> Result<Box<dyn DefectModel>, ModelLoadError> {
    match &card.model {
        ModelSpec::Logistic(model) => Ok(Box::new(model.clone())),
        ModelSpec::Onnx { path, sha256, outputs } => {
            let graph_path = match card_path.parent() {
                Some(dir) if path.is_relative() => dir.join(path),
                _ => path.clone(),
            };

            if let Some(expected) = sha256 {
                checksum::verify_checksum(&graph_path, expected)?;
            }

            let model = OnnxModel::load(&graph_path, outputs, card.feature_names_in.len())?;
            Ok(Box::new(model))
        }
    }
}

/// Read and validate the scaler. Feature coverage is checked when it is
/// attached to the classifier.
fn load_scaler(path: &Path) -> Result<ScalerArtifact, ModelLoadError> {
    log::info!("Loading scaler from: {}", path.display());

    let scaler: ScalerArtifact = read_json(path)?;
    scaler.validate()
        .map_err(|reason| ModelLoadError::corrupt(path, reason))?;

    Ok(scaler)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ModelLoadError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ModelLoadError::NotFound(path.to_path_buf()),
        _ => ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    serde_json::from_str(&text).map_err(|e| ModelLoadError::corrupt(path, e))
}

// ============================================================================
// TESTS
// ============================================================================
