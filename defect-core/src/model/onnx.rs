//! ONNX Runtime classifier
//!
//! Runs a graph exported from the training pipeline. The graph takes one
//! float tensor `[1, n_features]` and exposes a class-probability tensor
//! `[1, 2]` (exported without zipmap) and/or an int64 label tensor `[1]`.
//! A graph with only the label output runs in degraded mode.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{DefectModel, OutputCapability};
use crate::error::{ModelLoadError, PredictionError};

/// Output tensor names, as declared in the model card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnnxOutputs {
    #[serde(default)]
    pub probabilities: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

pub struct OnnxModel {
    // running a session needs exclusive access
    session: Mutex<Session>,
    probability_output: Option<String>,
    label_output: String,
    n_features: usize,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("probability_output", &self.probability_output)
            .field("label_output", &self.label_output)
            .field("n_features", &self.n_features)
            .finish()
    }
}

impl OnnxModel {
    /// Load the graph and resolve which outputs carry probability and label.
    pub fn load(
        model_path: &Path,
        declared: &OnnxOutputs,
        n_features: usize,
    ) -> Result<Self, ModelLoadError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ModelLoadError::NotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| ModelLoadError::Runtime(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelLoadError::Runtime(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ModelLoadError::corrupt(model_path, e))?;

        let names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        let (probability_output, label_output) = resolve_outputs(&names, declared)
            .map_err(|reason| ModelLoadError::corrupt(model_path, reason))?;

        log::info!(
            "ONNX model loaded (outputs: {:?}, probability: {:?}, label: {})",
            names,
            probability_output,
            label_output
        );

        Ok(Self {
            session: Mutex::new(session),
            probability_output,
            label_output,
            n_features,
        })
    }

    fn input_tensor(&self, row: &[f32]) -> Result<Tensor<f32>, PredictionError> {
        if row.len() != self.n_features {
            return Err(PredictionError::ShapeMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        let array = Array2::<f32>::from_shape_vec((1, self.n_features), row.to_vec())
            .map_err(|e| PredictionError::Backend(format!("Array error: {}", e)))?;

        Tensor::from_array(array)
            .map_err(|e| PredictionError::Backend(format!("Tensor error: {}", e)))
    }

    fn run_f32(&self, row: &[f32], output_name: &str) -> Result<Vec<f32>, PredictionError> {
        let input_tensor = self.input_tensor(row)?;
        let mut session = self.session.lock();

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| PredictionError::Backend(format!("Inference failed: {}", e)))?;
        let output = outputs
            .get(output_name)
            .ok_or_else(|| PredictionError::Backend(format!("No output {}", output_name)))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictionError::Backend(format!("Extract error: {}", e)))?;

        Ok(data.to_vec())
    }

    fn run_i64(&self, row: &[f32], output_name: &str) -> Result<Vec<i64>, PredictionError> {
        let input_tensor = self.input_tensor(row)?;
        let mut session = self.session.lock();

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| PredictionError::Backend(format!("Inference failed: {}", e)))?;
        let output = outputs
            .get(output_name)
            .ok_or_else(|| PredictionError::Backend(format!("No output {}", output_name)))?;
        let (_, data) = output
            .try_extract_tensor::<i64>()
            .map_err(|e| PredictionError::Backend(format!("Extract error: {}", e)))?;

        Ok(data.to_vec())
    }
}

impl DefectModel for OnnxModel {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn capability(&self) -> OutputCapability {
        if self.probability_output.is_some() {
            OutputCapability::Probability
        } else {
            OutputCapability::LabelOnly
        }
    }

    fn predict_proba(&self, row: &[f32]) -> Result<f32, PredictionError> {
        let name = self
            .probability_output
            .as_deref()
            .ok_or_else(|| PredictionError::Backend("model has no probability output".to_string()))?;

        let data = self.run_f32(row, name)?;
        // [p(no defect), p(defect)] or a single positive-class column
        match data.as_slice() {
            [_, positive] => Ok(*positive),
            [positive] => Ok(*positive),
            other => Err(PredictionError::ShapeMismatch {
                expected: 2,
                actual: other.len(),
            }),
        }
    }

    fn predict(&self, row: &[f32]) -> Result<i64, PredictionError> {
        let data = self.run_i64(row, &self.label_output)?;
        data.first()
            .copied()
            .ok_or_else(|| PredictionError::Backend("empty label output".to_string()))
    }
}

/// Pick the probability and label outputs among the graph's outputs.
///
/// Declared names must exist. Undeclared ones are matched by substring
/// (`prob`, `label`), which covers the default names of common exporters.
fn resolve_outputs(
    names: &[String],
    declared: &OnnxOutputs,
) -> Result<(Option<String>, String), String> {
    let find = |declared: &Option<String>, needle: &str| -> Result<Option<String>, String> {
        match declared {
            Some(name) if names.contains(name) => Ok(Some(name.clone())),
            Some(name) => Err(format!("declared output '{}' not in graph {:?}", name, names)),
            None => Ok(names
                .iter()
                .find(|n| n.to_lowercase().contains(needle))
                .cloned()),
        }
    };

    let probability = find(&declared.probabilities, "prob")?;
    let label = match find(&declared.label, "label")? {
        Some(label) => label,
        None => names
            .iter()
            .find(|n| Some(*n) != probability.as_ref())
            .cloned()
            .ok_or_else(|| format!("graph has no label output {:?}", names))?,
    };

    Ok((probability, label))
}
