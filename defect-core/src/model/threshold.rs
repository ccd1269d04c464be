//! Decision Threshold Configuration
//!
//! The user picks the probability cutoff between "defect" and "no defect"
//! from a bounded, stepped range.

use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// Threshold Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Threshold used when the caller does not choose one
    pub default_threshold: f32,

    /// Minimum selectable threshold (floor)
    pub min_threshold: f32,

    /// Maximum selectable threshold (ceiling)
    pub max_threshold: f32,

    /// Distance between selectable values
    pub step: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.7,
            min_threshold: 0.5,
            max_threshold: 0.9,
            step: 0.05,
        }
    }
}

impl ThresholdConfig {
    /// Default range with a different starting value, clamped into range.
    pub fn new(default_threshold: f32) -> Self {
        let base = Self::default();
        let default_threshold = if default_threshold.is_finite() {
            default_threshold.clamp(base.min_threshold, base.max_threshold)
        } else {
            base.default_threshold
        };

        Self {
            default_threshold,
            ..base
        }
    }

    pub fn contains(&self, threshold: f32) -> bool {
        threshold.is_finite() && threshold >= self.min_threshold && threshold <= self.max_threshold
    }

    /// Reject thresholds outside `[min_threshold, max_threshold]`.
    pub fn validate(&self, threshold: f32) -> Result<f32, InferenceError> {
        if self.contains(threshold) {
            Ok(threshold)
        } else {
            Err(InferenceError::InvalidThreshold(threshold))
        }
    }

    /// Every selectable value from min to max, inclusive.
    pub fn steps(&self) -> Vec<f32> {
        if !(self.step > 0.0) || self.max_threshold < self.min_threshold {
            return vec![self.default_threshold];
        }

        let count = ((self.max_threshold - self.min_threshold) / self.step).round() as usize;
        (0..=count)
            .map(|i| {
                let value = self.min_threshold + self.step * i as f32;
                // keep 0.70 from printing as 0.70000005
                (value * 100.0).round() / 100.0
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_config() {
        let config = ThresholdConfig::default();
        assert_eq!(config.default_threshold, 0.7);
        assert_eq!(config.min_threshold, 0.5);
        assert_eq!(config.max_threshold, 0.9);
    }

    #[test]
    fn test_validate_bounds() {
        let config = ThresholdConfig::default();
        assert!(config.validate(0.5).is_ok());
        assert!(config.validate(0.9).is_ok());
        assert!(config.validate(0.7).is_ok());
        assert!(matches!(config.validate(0.45), Err(InferenceError::InvalidThreshold(_))));
        assert!(config.validate(0.95).is_err());
        assert!(config.validate(f32::NAN).is_err());
    }

    #[test]
    fn test_steps() {
        let steps = ThresholdConfig::default().steps();
        assert_eq!(steps.len(), 9);
        assert_eq!(steps.first(), Some(&0.5));
        assert_eq!(steps.last(), Some(&0.9));
        assert!(steps.contains(&0.7));
    }

    #[test]
    fn test_new_clamps() {
        assert_eq!(ThresholdConfig::new(0.8).default_threshold, 0.8);
        assert_eq!(ThresholdConfig::new(0.2).default_threshold, 0.5);
        assert_eq!(ThresholdConfig::new(1.5).default_threshold, 0.9);
        assert_eq!(ThresholdConfig::new(f32::NAN).default_threshold, 0.7);
    }
}
