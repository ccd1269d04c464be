//! Fitted feature scalers.
//!
//! Parameters come from the training pipeline. `feature_names_in` is the
//! column order the scaler was fit with and becomes the authoritative order
//! for building feature vectors whenever a scaler is loaded. The model still
//! reads its own column order, so `AlignedScaler` maps scaled rows back onto
//! it.

use serde::{Deserialize, Serialize};

use super::FeatureScaler;
use crate::error::{ModelLoadError, PredictionError};
use crate::features::{layout_fingerprint, FeatureOrder};

/// Serialized scaler artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub feature_names_in: Vec<String>,
    #[serde(flatten)]
    pub params: ScalerParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// (x - mean) / scale
    Standard { mean: Vec<f32>, scale: Vec<f32> },
    /// (x - data_min) / (data_max - data_min)
    MinMax { data_min: Vec<f32>, data_max: Vec<f32> },
}

impl ScalerArtifact {
    /// Every parameter vector must have one entry per feature.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.feature_names_in.len();
        if n == 0 {
            return Err("scaler declares no features".to_string());
        }

        let (a, b) = match &self.params {
            ScalerParams::Standard { mean, scale } => (mean, scale),
            ScalerParams::MinMax { data_min, data_max } => (data_min, data_max),
        };
        if a.len() != n || b.len() != n {
            return Err(format!(
                "scaler parameters have {}/{} entries for {} features",
                a.len(),
                b.len(),
                n
            ));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".to_string());
        }

        Ok(())
    }
}

impl FeatureScaler for ScalerArtifact {
    fn feature_names_in(&self) -> &[String] {
        &self.feature_names_in
    }

    fn transform(&self, row: &[f32]) -> Result<Vec<f32>, PredictionError> {
        let expected = self.feature_names_in.len();
        if row.len() != expected {
            return Err(PredictionError::ShapeMismatch {
                expected,
                actual: row.len(),
            });
        }

        let scaled = match &self.params {
            ScalerParams::Standard { mean, scale } => row
                .iter()
                .zip(mean.iter().zip(scale.iter()))
                .map(|(x, (m, s))| {
                    // constant training columns are stored with scale 0
                    let s = if *s == 0.0 { 1.0 } else { *s };
                    (x - m) / s
                })
                .collect(),
            ScalerParams::MinMax { data_min, data_max } => row
                .iter()
                .zip(data_min.iter().zip(data_max.iter()))
                .map(|(x, (lo, hi))| {
                    let range = (hi - lo).max(1e-8);
                    (x - lo) / range
                })
                .collect(),
        };

        Ok(scaled)
    }
}

/// A scaler whose output is permuted into the model's column order.
pub struct AlignedScaler {
    inner: Box<dyn FeatureScaler>,
    /// `to_model[i]` is the scaled column feeding model column `i`
    to_model: Option<Vec<usize>>,
}

impl std::fmt::Debug for AlignedScaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedScaler")
            .field("feature_names_in", &self.inner.feature_names_in())
            .field("to_model", &self.to_model)
            .finish()
    }
}

impl AlignedScaler {
    /// Fails with `FeatureOrderMismatch` unless the scaler covers exactly
    /// `model_names`.
    pub fn new(inner: Box<dyn FeatureScaler>, model_names: &[String]) -> Result<Self, ModelLoadError> {
        let scaler_order = FeatureOrder::new(inner.feature_names_in().iter().cloned());
        let mismatch = || ModelLoadError::FeatureOrderMismatch {
            scaler: scaler_order.fingerprint(),
            model: layout_fingerprint(model_names),
        };

        if scaler_order.len() != model_names.len() {
            return Err(mismatch());
        }

        let to_model = model_names
            .iter()
            .map(|name| scaler_order.index_of(name))
            .collect::<Option<Vec<usize>>>()
            .ok_or_else(mismatch)?;

        let identity = to_model.iter().enumerate().all(|(i, &j)| i == j);
        if !identity {
            log::warn!(
                "Scaler column order differs from the model's; scaled rows are permuted into model order"
            );
        }

        Ok(Self {
            inner,
            to_model: (!identity).then_some(to_model),
        })
    }

    pub fn is_permuted(&self) -> bool {
        self.to_model.is_some()
    }
}

impl FeatureScaler for AlignedScaler {
    fn feature_names_in(&self) -> &[String] {
        self.inner.feature_names_in()
    }

    fn transform(&self, row: &[f32]) -> Result<Vec<f32>, PredictionError> {
        let scaled = self.inner.transform(row)?;
        let Some(to_model) = &self.to_model else {
            return Ok(scaled);
        };

        to_model
            .iter()
            .map(|&i| {
                scaled.get(i).copied().ok_or(PredictionError::ShapeMismatch {
                    expected: to_model.len(),
                    actual: scaled.len(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> ScalerArtifact {
        ScalerArtifact {
            feature_names_in: vec!["Temperature".into(), "Pressure".into()],
            params: ScalerParams::Standard {
                mean: vec![70.0, 5.0],
                scale: vec![10.0, 0.0],
            },
        }
    }

    #[test]
    fn test_standard_transform() {
        let out = standard().transform(&[80.0, 5.5]).unwrap();
        assert_eq!(out, vec![1.0, 0.5]);
    }

    #[test]
    fn test_min_max_transform() {
        let scaler = ScalerArtifact {
            feature_names_in: vec!["Humidity".into()],
            params: ScalerParams::MinMax {
                data_min: vec![20.0],
                data_max: vec![60.0],
            },
        };

        assert_eq!(scaler.transform(&[40.0]).unwrap(), vec![0.5]);
        // values outside the fitted range are not clipped
        assert_eq!(scaler.transform(&[80.0]).unwrap(), vec![1.5]);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = standard().transform(&[1.0]).unwrap_err();
        assert_eq!(err, PredictionError::ShapeMismatch { expected: 2, actual: 1 });
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "kind": "standard",
            "feature_names_in": ["Temperature", "Pressure"],
            "mean": [70.0, 5.0],
            "scale": [10.0, 0.0]
        }"#;
        let scaler: ScalerArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(scaler, standard());
        assert!(scaler.validate().is_ok());
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_aligned_scaler_permutes_into_model_order() {
        // scaler fit as [Pressure, Temperature], model reads [Temperature, Pressure]
        let scaler = ScalerArtifact {
            feature_names_in: names(&["Pressure", "Temperature"]),
            params: ScalerParams::Standard {
                mean: vec![5.0, 70.0],
                scale: vec![0.5, 10.0],
            },
        };
        let aligned = AlignedScaler::new(Box::new(scaler), &names(&["Temperature", "Pressure"])).unwrap();

        assert!(aligned.is_permuted());
        assert_eq!(aligned.feature_names_in(), ["Pressure", "Temperature"]);
        // input in scaler order: pressure 6, temperature 80
        assert_eq!(aligned.transform(&[6.0, 80.0]).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_aligned_scaler_same_order_passes_through() {
        let aligned = AlignedScaler::new(Box::new(standard()), &names(&["Temperature", "Pressure"])).unwrap();
        assert!(!aligned.is_permuted());
        assert_eq!(aligned.transform(&[80.0, 5.5]).unwrap(), vec![1.0, 0.5]);
    }

    #[test]
    fn test_aligned_scaler_rejects_other_feature_set() {
        for model in [
            names(&["Temperature", "Humidity"]),
            names(&["Temperature"]),
            names(&["Temperature", "Pressure", "Humidity"]),
        ] {
            let err = AlignedScaler::new(Box::new(standard()), &model).unwrap_err();
            assert!(matches!(err, ModelLoadError::FeatureOrderMismatch { .. }));
        }
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let mut scaler = standard();
        scaler.params = ScalerParams::Standard {
            mean: vec![1.0],
            scale: vec![1.0, 1.0],
        };
        assert!(scaler.validate().is_err());

        scaler.feature_names_in.clear();
        assert!(scaler.validate().is_err());
    }
}
