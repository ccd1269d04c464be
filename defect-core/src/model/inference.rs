//! Inference - build, predict, classify
//!
//! One request runs the full linear sequence:
//! record → ordered feature vector → (scaler) → probability → verdict.
//! Feature validation happens before the model is touched.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::scaler::AlignedScaler;
use super::threshold::ThresholdConfig;
use super::{DefectModel, FeatureScaler, OutputCapability};
use crate::error::{InferenceResult, ModelLoadError, PredictionError};
use crate::features::{
    build_feature_vector, layout_fingerprint, FeatureOrder, FeatureRecord, FeatureVector,
};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Defect,
    NoDefect,
}

impl Verdict {
    pub fn is_defect(self) -> bool {
        self == Verdict::Defect
    }

    /// Alert text shown to operators
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Defect => "High Risk of Defect",
            Verdict::NoDefect => "Low Risk of Defect",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Defect => write!(f, "Defect"),
            Verdict::NoDefect => write!(f, "No Defect"),
        }
    }
}

/// Raw model output before thresholding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityOutput {
    pub probability: f32,
    /// Probability is a hard 0/1 label
    pub degraded: bool,
}

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f32,        // 0.0 - 1.0
    pub threshold: f32,          // 0.5 - 0.9
    pub verdict: Verdict,
    pub degraded: bool,
    pub inference_time_us: u64,
}

impl Prediction {
    /// Probability as a percentage with one decimal, e.g. `82.0%`.
    pub fn probability_percent(&self) -> String {
        format!("{:.1}%", self.probability * 100.0)
    }

    /// `[(No Defect, 1 - p), (Defect, p)]`
    pub fn distribution(&self) -> [(Verdict, f32); 2] {
        [
            (Verdict::NoDefect, 1.0 - self.probability),
            (Verdict::Defect, self.probability),
        ]
    }
}

// ============================================================================
// CORE OPERATIONS
// ============================================================================

/// `Defect` iff `probability >= threshold`. Ties flag a defect.
pub fn classify(probability: f32, threshold: f32) -> Verdict {
    if probability >= threshold {
        Verdict::Defect
    } else {
        Verdict::NoDefect
    }
}

/// Run the scaler (if any) and the model on an already ordered vector.
///
/// When a scaler is given, `vector` must have been built with
/// `scaler.feature_names_in()`; anything else is a `LayoutMismatch`. The
/// scaler's output goes to the model as is, so a scaler fit on another column
/// order than the model must be wrapped in an `AlignedScaler`.
/// Models without probability output fall back to their hard label and the
/// result is flagged `degraded`.
pub fn predict_defect_probability(
    vector: &FeatureVector,
    model: &dyn DefectModel,
    scaler: Option<&dyn FeatureScaler>,
) -> Result<ProbabilityOutput, PredictionError> {
    let scaled;
    let row = match scaler {
        Some(scaler) => {
            let names = scaler.feature_names_in();
            if !vector.is_compatible(names) {
                return Err(PredictionError::LayoutMismatch {
                    expected: layout_fingerprint(names),
                    actual: vector.layout_fingerprint,
                });
            }
            scaled = scaler.transform(vector.as_slice())?;
            scaled.as_slice()
        }
        None => vector.as_slice(),
    };

    match model.capability() {
        OutputCapability::Probability => {
            let probability = model.predict_proba(row)?;
            if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
                return Err(PredictionError::InvalidProbability(probability));
            }
            Ok(ProbabilityOutput {
                probability,
                degraded: false,
            })
        }
        OutputCapability::LabelOnly => {
            let label = model.predict(row)?;
            let probability = match label {
                0 => 0.0,
                1 => 1.0,
                other => return Err(PredictionError::InvalidLabel(other)),
            };
            log::warn!(
                "{} model has no probability output, using hard label {}",
                model.kind(),
                label
            );
            Ok(ProbabilityOutput {
                probability,
                degraded: true,
            })
        }
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Latency stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceStats {
    pub inference_count: u64,
    pub avg_latency_ms: f32,
}

/// Immutable handle over the loaded artifacts.
pub struct DefectClassifier {
    model: Box<dyn DefectModel>,
    scaler: Option<Box<dyn FeatureScaler>>,
    order: FeatureOrder,
    thresholds: ThresholdConfig,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl fmt::Debug for DefectClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefectClassifier")
            .field("model", &self.model.kind())
            .field("scaler", &self.scaler.is_some())
            .field("order", &self.order)
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

impl DefectClassifier {
    /// `order` is the feature order the model declares.
    pub fn new(model: Box<dyn DefectModel>, order: FeatureOrder) -> Self {
        Self {
            model,
            scaler: None,
            order,
            thresholds: ThresholdConfig::default(),
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    /// Attach a scaler. Its `feature_names_in` becomes the order vectors are
    /// built in; scaled rows are mapped back to the model's order.
    pub fn with_scaler(mut self, scaler: Box<dyn FeatureScaler>) -> Result<Self, ModelLoadError> {
        let aligned = AlignedScaler::new(scaler, self.order.names())?;
        self.order = self.order.reordered(aligned.feature_names_in());
        self.scaler = Some(Box::new(aligned));
        Ok(self)
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdConfig) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn feature_order(&self) -> &FeatureOrder {
        &self.order
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }

    pub fn has_scaler(&self) -> bool {
        self.scaler.is_some()
    }

    pub fn is_degraded(&self) -> bool {
        self.model.capability() == OutputCapability::LabelOnly
    }

    /// Build → predict → classify for one record.
    pub fn predict(&self, record: &FeatureRecord, threshold: f32) -> InferenceResult<Prediction> {
        let start_time = Instant::now();
        let threshold = self.thresholds.validate(threshold)?;

        let vector = build_feature_vector(record, &self.order)?;
        log::trace!("features: {}", vector.to_log_entry(&self.order));
        let output = predict_defect_probability(&vector, self.model.as_ref(), self.scaler.as_deref())?;
        let verdict = classify(output.probability, threshold);

        let inference_time_us = start_time.elapsed().as_micros() as u64;
        self.latency_sum_us.fetch_add(inference_time_us, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "prediction p={:.4} threshold={:.2} verdict={} degraded={} ({}us)",
            output.probability,
            threshold,
            verdict,
            output.degraded,
            inference_time_us
        );

        Ok(Prediction {
            probability: output.probability,
            threshold,
            verdict,
            degraded: output.degraded,
            inference_time_us,
        })
    }

    pub fn stats(&self) -> InferenceStats {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        InferenceStats {
            inference_count: count,
            avg_latency_ms: avg,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
