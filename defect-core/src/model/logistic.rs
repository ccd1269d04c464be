//! Logistic regression classifier evaluated natively.

use serde::{Deserialize, Serialize};

use super::{DefectModel, OutputCapability};
use crate::error::PredictionError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f32>,
    pub intercept: f32,
}

impl LogisticModel {
    pub fn new(coefficients: Vec<f32>, intercept: f32) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    fn decision(&self, row: &[f32]) -> Result<f32, PredictionError> {
        if row.len() != self.coefficients.len() {
            return Err(PredictionError::ShapeMismatch {
                expected: self.coefficients.len(),
                actual: row.len(),
            });
        }

        Ok(self
            .coefficients
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f32>()
            + self.intercept)
    }
}

impl DefectModel for LogisticModel {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn capability(&self) -> OutputCapability {
        OutputCapability::Probability
    }

    fn predict_proba(&self, row: &[f32]) -> Result<f32, PredictionError> {
        let z = self.decision(row)?;
        Ok(1.0 / (1.0 + (-z).exp()))
    }

    fn predict(&self, row: &[f32]) -> Result<i64, PredictionError> {
        Ok(i64::from(self.decision(row)? >= 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_decision_is_half() {
        let model = LogisticModel::new(vec![1.0, -1.0], 0.0);
        assert_eq!(model.predict_proba(&[2.0, 2.0]).unwrap(), 0.5);
        assert_eq!(model.predict(&[2.0, 2.0]).unwrap(), 1);
    }

    #[test]
    fn test_probability_is_monotonic_in_decision() {
        let model = LogisticModel::new(vec![0.5], -1.0);
        let low = model.predict_proba(&[0.0]).unwrap();
        let high = model.predict_proba(&[10.0]).unwrap();

        assert!(low < 0.5);
        assert!(high > 0.9);
        assert_eq!(model.predict(&[0.0]).unwrap(), 0);
    }

    #[test]
    fn test_shape_mismatch() {
        let model = LogisticModel::new(vec![1.0, 2.0, 3.0], 0.0);
        assert_eq!(
            model.predict_proba(&[1.0]).unwrap_err(),
            PredictionError::ShapeMismatch { expected: 3, actual: 1 }
        );
    }
}
